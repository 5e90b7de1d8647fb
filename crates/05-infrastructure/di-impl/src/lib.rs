//! # 依赖注入具体实现
//!
//! 提供依赖注入容器、参考模块和绑定容器的调用包装。
//!
//! ```ignore
//! let module = MapModule::new().with_value("foo", Foo::default());
//! let container = Container::from_modules(vec![Arc::new(module)]);
//! container.configure(ContainerOptions::default()).await?;
//! let bar = container.create_as::<Bar>(Contract::of::<Bar>()).await?;
//! ```

pub mod container;
pub mod map_module;
pub mod wrap;

pub use container::*;
pub use map_module::*;
pub use wrap::*;
