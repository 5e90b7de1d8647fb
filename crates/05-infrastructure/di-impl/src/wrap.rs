//! 绑定容器的调用包装
//!
//! 包装只把固定的容器放进调用方给出的选项，不会解析声明的依赖。
//! 需要依赖解析时使用 [`Container::construct`] 或 [`Container::apply`]。

use crate::container::Container;
use di_abstractions::{Constructor, ExtraArgs, Factory, Injected, Options, Scope, Value};
use di_common::DiResult;
use futures::future::BoxFuture;
use std::sync::Arc;

/// 固定了容器的调用
pub type BoundFn = Arc<dyn Fn(Options, ExtraArgs) -> BoxFuture<'static, DiResult<Value>> + Send + Sync>;

/// 以固定容器直接调用构造函数
pub fn construct_with_container(container: &Container, constructor: Constructor) -> BoundFn {
    let resolver = container.as_resolver();
    Arc::new(move |options: Options, args: ExtraArgs| {
        constructor.invoke(Injected::new(options, resolver.clone()), args)
    })
}

/// 以固定容器直接调用工厂，`scope` 作为接收者
pub fn invoke_with_container(container: &Container, factory: Factory, scope: Scope) -> BoundFn {
    let resolver = container.as_resolver();
    Arc::new(move |options: Options, args: ExtraArgs| {
        factory.invoke(scope.clone(), Injected::new(options, resolver.clone()), args)
    })
}
