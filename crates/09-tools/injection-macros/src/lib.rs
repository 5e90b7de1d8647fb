//! # Injection Macros
//!
//! 这个 crate 提供了在进程启动时登记依赖声明的过程宏。
//!
//! ## 核心宏
//!
//! - [`inject`] - 登记类型依赖与构造函数
//! - [`Fields`] - 登记字段绑定并实现 `FieldTarget`
//!
//! ## 使用示例
//!
//! ```ignore
//! use injection_macros::{inject, Fields};
//!
//! #[inject("foo", Store, cache = "redis")]
//! pub struct Bar {
//!     foo: Arc<Foo>,
//! }
//!
//! #[derive(Default, Fields)]
//! pub struct Settings {
//!     #[field("config")]
//!     config: Option<Arc<Config>>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod fields;
mod inject;
mod utils;

/// 依赖登记宏
///
/// 被标注的类型需要实现 `Injectable`。
///
/// # 参数
///
/// - `"name"` / `Type` - 以规范名称为键的依赖
/// - `key = "name"` / `key = Type` - 以 `key` 为键的依赖
/// - `with_fields` - 同时依赖所有字段契约
/// - `extends(Base)` - 声明父类型
///
/// # 示例
///
/// ```ignore
/// #[inject("foo", Store, with_fields)]
/// pub struct Bar;
/// ```
#[proc_macro_attribute]
pub fn inject(args: TokenStream, input: TokenStream) -> TokenStream {
    inject::inject_impl(args, input)
}

/// 字段注入派生宏
///
/// 带 `#[field(..)]` 的字段类型需要是 `Arc<T>` 或 `Option<Arc<T>>`。
///
/// # 示例
///
/// ```ignore
/// #[derive(Fields)]
/// pub struct Settings {
///     #[field("config")]
///     config: Option<Arc<Config>>,
/// }
/// ```
#[proc_macro_derive(Fields, attributes(field))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    fields::derive_fields_impl(input)
}
