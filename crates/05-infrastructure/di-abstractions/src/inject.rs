//! 依赖声明
//!
//! 为类型、方法和工厂登记所需的依赖。Rust 没有装饰器，这里提供显式的
//! 注册函数，`#[inject]` 宏在进程启动时生成相同的调用。

use crate::dependency::{resolve_depends, Dependency, InjectedDependency};
use crate::metadata::{self, MemberKind, Target};
use crate::provider::{Constructor, Factory, Injectable};
use di_common::{DiError, DiResult, TypeInfo};
use std::marker::PhantomData;
use tracing::debug;

/// 类型依赖声明构建器
///
/// ```ignore
/// Inject::<Bar>::new()
///     .requires("foo")
///     .requires(Dependency::named("store", Contract::of::<Store>()))
///     .register()?;
/// ```
pub struct Inject<T> {
    deps: Vec<Dependency>,
    with_fields: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Injectable> Inject<T> {
    pub fn new() -> Self {
        Self {
            deps: Vec::new(),
            with_fields: false,
            _marker: PhantomData,
        }
    }

    /// 追加一个依赖
    pub fn requires(mut self, dependency: impl Into<InjectedDependency>) -> Self {
        self.deps.push(dependency.into().resolve());
        self
    }

    /// 追加多个依赖
    pub fn requires_all<I>(mut self, deps: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<InjectedDependency>,
    {
        self.deps.extend(resolve_depends(deps));
        self
    }

    /// 同时依赖所有声明过的字段契约
    pub fn with_fields(mut self) -> Self {
        self.with_fields = true;
        self
    }

    /// 登记依赖与构造函数
    ///
    /// 依赖以继承方式写入，祖先类型的依赖仍会被解析。
    pub fn register(self) -> DiResult<()> {
        let type_info = TypeInfo::of::<T>();
        debug!(
            target_type = type_info.name,
            count = self.deps.len(),
            with_fields = self.with_fields,
            "登记类型依赖"
        );

        metadata::decorate(&Target::Type(type_info.clone()), self.deps)?;
        if self.with_fields {
            metadata::require_fields(&type_info);
        }
        metadata::register_constructor(Constructor::of::<T>());
        Ok(())
    }
}

impl<T: Injectable> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// 登记类型依赖的简写
pub fn inject<T, I>(deps: I) -> DiResult<()>
where
    T: Injectable,
    I: IntoIterator,
    I::Item: Into<InjectedDependency>,
{
    Inject::<T>::new().requires_all(deps).register()
}

/// 为类型上的方法登记依赖
///
/// 先在 `T` 自身查找成员，找不到时查找直接父类型。
pub fn inject_method<T, I>(method: &str, deps: I) -> DiResult<()>
where
    T: ?Sized + 'static,
    I: IntoIterator,
    I::Item: Into<InjectedDependency>,
{
    let owner = TypeInfo::of::<T>();
    let found = match metadata::member_kind(owner.id, method) {
        Some(kind) => Some((owner.clone(), kind)),
        None => metadata::parent_of(owner.id).and_then(|parent| {
            metadata::member_kind(parent.id, method).map(|kind| (parent, kind))
        }),
    };

    match found {
        None => Err(DiError::descriptor_not_found(format!("{}::{}", owner, method))),
        Some((owner, MemberKind::Field)) => Err(DiError::invalid_target(format!(
            "{}::{} 是字段，不能注入方法依赖",
            owner, method
        ))),
        Some((owner, MemberKind::Method)) => metadata::decorate(
            &Target::Method {
                owner,
                name: method.to_string(),
            },
            resolve_depends(deps),
        ),
    }
}

/// 为独立工厂登记依赖
pub fn inject_factory<I>(factory: &Factory, deps: I) -> DiResult<()>
where
    I: IntoIterator,
    I::Item: Into<InjectedDependency>,
{
    metadata::decorate(factory.target(), resolve_depends(deps))
}

/// 读取声明的依赖
pub fn get_inject(target: &Target) -> Vec<Dependency> {
    metadata::read(target)
}
