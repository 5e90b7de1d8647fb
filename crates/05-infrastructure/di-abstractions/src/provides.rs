//! 提供者方法
//!
//! 模块类型上的方法可以声明自己能提供哪些契约，模块配置时会把它们
//! 绑定为工厂，调用时以模块实例作为接收者。

use crate::dependency::{resolve_depends, Dependency, InjectedDependency};
use crate::metadata::{self, MemberKind, Target};
use crate::options::{ExtraArgs, Injected, Value};
use crate::provider::{Factory, FactoryFn, Scope};
use di_common::{DiError, DiResult, TypeInfo};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;

/// 在类型 `M` 上登记提供者方法
///
/// 同一方法重复登记时契约追加，方法体以最后一次为准。
pub fn provides<M, F, Fut, I>(method: &str, contracts: I, f: F) -> DiResult<Factory>
where
    M: Any + Send + Sync,
    F: Fn(Arc<M>, Injected, ExtraArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DiResult<Value>> + Send + 'static,
    I: IntoIterator,
    I::Item: Into<InjectedDependency>,
{
    let owner = TypeInfo::of::<M>();
    if metadata::member_kind(owner.id, method) == Some(MemberKind::Field) {
        return Err(DiError::invalid_target(format!(
            "{}::{} 是字段，不能作为提供者",
            owner, method
        )));
    }
    metadata::declare_member(&owner, method, MemberKind::Method)?;

    let receiver = owner.clone();
    let call: FactoryFn = Arc::new(
        move |scope: Scope, options: Injected, args: ExtraArgs| -> BoxFuture<'static, DiResult<Value>> {
            match scope.downcast::<M>() {
                Ok(module) => f(module, options, args).boxed(),
                Err(_) => {
                    let message = format!("提供者方法的接收者不是 {}", receiver);
                    async move { Err(DiError::invalid_target(message)) }.boxed()
                }
            }
        },
    );

    let factory = Factory::for_method(owner, method, call);
    metadata::attach_provides(factory.target(), resolve_depends(contracts), factory.clone())?;
    Ok(factory)
}

/// 方法声明能提供的契约
pub fn get_provides(target: &Target) -> Vec<Dependency> {
    metadata::read_provides(target)
}
