//! 提供者定义
//!
//! 模块通过提供者满足契约：构造函数、工厂或现成实例。

use crate::metadata::{FunctionId, Target, Upcast};
use crate::options::{ExtraArgs, Injected, Value};
use async_trait::async_trait;
use di_common::{DiError, DiResult, TypeInfo};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// 工厂调用时的接收者，通常是拥有该工厂的模块
pub type Scope = Arc<dyn Any + Send + Sync>;

/// 类型擦除的构造函数
pub type ConstructFn =
    Arc<dyn Fn(Injected, ExtraArgs) -> BoxFuture<'static, DiResult<Value>> + Send + Sync>;

/// 类型擦除的工厂函数
pub type FactoryFn =
    Arc<dyn Fn(Scope, Injected, ExtraArgs) -> BoxFuture<'static, DiResult<Value>> + Send + Sync>;

/// 可注入类型 trait
///
/// 第一个参数是解析好的依赖与容器，其后是调用方追加的位置参数。
#[async_trait]
pub trait Injectable: Any + Send + Sync + Sized {
    /// 使用注入选项构建实例
    async fn construct(options: Injected, args: ExtraArgs) -> DiResult<Self>;
}

/// 构造函数提供者
#[derive(Clone)]
pub struct Constructor {
    type_info: TypeInfo,
    construct: ConstructFn,
}

impl Constructor {
    /// 可注入类型的构造函数
    pub fn of<T: Injectable>() -> Self {
        Self::new(
            TypeInfo::of::<T>(),
            |options: Injected, args: ExtraArgs| async move {
                let instance = T::construct(options, args).await?;
                Ok(Arc::new(instance) as Value)
            },
        )
    }

    /// 以任意闭包作为某类型的构造函数
    pub fn new<F, Fut>(type_info: TypeInfo, construct: F) -> Self
    where
        F: Fn(Injected, ExtraArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<Value>> + Send + 'static,
    {
        Self {
            type_info,
            construct: Arc::new(move |options, args| construct(options, args).boxed()),
        }
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// 读取依赖元数据所用的声明
    pub fn target(&self) -> Target {
        Target::Type(self.type_info.clone())
    }

    pub fn invoke(&self, options: Injected, args: ExtraArgs) -> BoxFuture<'static, DiResult<Value>> {
        (self.construct)(options, args)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructor").field(&self.type_info).finish()
    }
}

/// 工厂提供者
#[derive(Clone)]
pub struct Factory {
    target: Target,
    call: FactoryFn,
}

impl Factory {
    /// 忽略接收者的工厂
    pub fn new<F, Fut>(name: &str, factory: F) -> Self
    where
        F: Fn(Injected, ExtraArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<Value>> + Send + 'static,
    {
        Self::scoped(name, move |_scope, options, args| factory(options, args))
    }

    /// 需要接收者的工厂
    pub fn scoped<F, Fut>(name: &str, factory: F) -> Self
    where
        F: Fn(Scope, Injected, ExtraArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DiResult<Value>> + Send + 'static,
    {
        Self {
            target: Target::Function(FunctionId::new(name)),
            call: Arc::new(move |scope, options, args| factory(scope, options, args).boxed()),
        }
    }

    /// 类型上的方法工厂
    pub fn for_method(owner: TypeInfo, method: impl Into<String>, call: FactoryFn) -> Self {
        Self {
            target: Target::Method {
                owner,
                name: method.into(),
            },
            call,
        }
    }

    /// 读取依赖元数据所用的声明
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn invoke(
        &self,
        scope: Scope,
        options: Injected,
        args: ExtraArgs,
    ) -> BoxFuture<'static, DiResult<Value>> {
        (self.call)(scope, options, args)
    }

    /// 调用前先转换接收者，声明保持不变
    pub fn with_receiver(&self, upcast: Upcast) -> Factory {
        let call = self.call.clone();
        let target = self.target.clone();
        let message = format!("无法将接收者转换为 {} 的所有者", target);
        Self {
            target,
            call: Arc::new(move |scope: Scope, options: Injected, args: ExtraArgs| match upcast(scope) {
                Some(receiver) => call(receiver, options, args),
                None => {
                    let message = message.clone();
                    async move { Err(DiError::invalid_target(message)) }.boxed()
                }
            }),
        }
    }

    /// 是否为同一个工厂声明
    pub fn same_target(&self, other: &Factory) -> bool {
        self.target == other.target
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Factory").field(&self.target).finish()
    }
}

/// 提供者类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    None,
    Constructor,
    Factory,
    Instance,
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Constructor => "constructor",
            Self::Factory => "factory",
            Self::Instance => "instance",
        };
        f.write_str(name)
    }
}

/// 模块满足某个契约的方式
#[derive(Clone)]
pub enum Provider {
    Constructor(Constructor),
    Factory(Factory),
    Instance(Value),
    None,
}

impl Provider {
    pub fn kind(&self) -> ProviderType {
        match self {
            Self::Constructor(_) => ProviderType::Constructor,
            Self::Factory(_) => ProviderType::Factory,
            Self::Instance(_) => ProviderType::Instance,
            Self::None => ProviderType::None,
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(constructor) => fmt::Debug::fmt(constructor, f),
            Self::Factory(factory) => fmt::Debug::fmt(factory, f),
            Self::Instance(_) => f.write_str("Instance(..)"),
            Self::None => f.write_str("None"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(constructor) => write!(f, "constructor {}", constructor.type_info()),
            Self::Factory(factory) => write!(f, "factory {}", factory.target()),
            Self::Instance(_) => f.write_str("instance"),
            Self::None => f.write_str("none"),
        }
    }
}
