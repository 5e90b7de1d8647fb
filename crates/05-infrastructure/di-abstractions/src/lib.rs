//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义契约、依赖声明、模块绑定和解析器接口。
//!
//! ## 核心接口
//!
//! - [`Contract`] - 可以向容器请求的事物的标识
//! - [`Inject`] / [`provides`] / [`field`] - 依赖声明
//! - [`Module`] - 契约到提供者的绑定表
//! - [`Resolver`] - 容器对构造函数和工厂暴露的解析能力

pub mod contract;
pub mod dependency;
pub mod field;
pub mod inject;
pub mod metadata;
pub mod module;
pub mod options;
pub mod provider;
pub mod provides;
pub mod resolver;

pub use contract::*;
pub use dependency::*;
pub use field::*;
pub use inject::*;
pub use metadata::{extends, extends_via, FunctionId, MemberKind, Target, Upcast};
pub use module::*;
pub use options::*;
pub use provider::*;
pub use provides::*;
pub use resolver::*;

pub use di_common::{DiError, DiResult, ErrorKind, Logger, TypeInfo};

/// 宏生成代码使用的依赖，不属于公开接口
#[doc(hidden)]
pub mod __private {
    pub use ctor::ctor;
    pub use tracing;
}
