//! # DI Common
//!
//! 这个 crate 提供了依赖注入运行时各层共享的基础类型。
//!
//! ## 核心内容
//!
//! - [`DiError`] - 统一的错误类型与 [`ErrorKind`] 分类
//! - [`TypeInfo`] - 以 `TypeId` 为键的类型信息
//! - [`Logger`] - 注入给容器和模块的日志接口
//! - [`ContainerConfig`] / [`LoggingConfig`] - 可从 TOML 加载的配置

pub mod configuration;
pub mod errors;
pub mod logging;
pub mod metadata;

pub use configuration::*;
pub use errors::*;
pub use logging::*;
pub use metadata::*;
