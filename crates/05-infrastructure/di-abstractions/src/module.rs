//! 模块抽象
//!
//! 模块持有一张契约到提供者的绑定表。容器在配置阶段调用每个模块的
//! [`Module::configure`]，之后按顺序询问模块是否能满足某个契约。

use crate::contract::Contract;
use crate::metadata::{self, Target, Upcast};
use crate::options::Value;
use crate::provider::{Constructor, Factory, Injectable, Provider, Scope};
use crate::resolver::{SharedResolver, WeakResolver};
use async_trait::async_trait;
use di_common::{DiError, DiResult, Logger, NullLogger, TypeInfo};
use parking_lot::RwLock;
use serde_json::json;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// 类型擦除辅助
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// 具体类型信息
    fn type_info(&self) -> TypeInfo;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_info(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }
}

/// 模块配置选项
#[derive(Clone)]
pub struct ModuleOptions {
    /// 正在配置本模块的容器
    pub container: SharedResolver,
    pub logger: Option<Arc<dyn Logger>>,
}

impl fmt::Debug for ModuleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleOptions")
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

struct BindingState {
    container: Option<WeakResolver>,
    logger: Option<Arc<dyn Logger>>,
}

/// 模块的绑定表
///
/// 每个契约最多一个提供者，重复绑定时替换。
pub struct Bindings {
    providers: RwLock<HashMap<Contract, Provider>>,
    state: RwLock<BindingState>,
}

impl Bindings {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
            state: RwLock::new(BindingState {
                container: None,
                logger: Some(NullLogger::shared()),
            }),
        }
    }

    /// 记录容器与日志记录器
    pub fn record(&self, options: &ModuleOptions) {
        let mut state = self.state.write();
        state.container = Some(Arc::downgrade(&options.container));
        state.logger = options.logger.clone();
    }

    /// 配置本模块的容器，容器已释放或尚未配置时为 `None`
    pub fn container(&self) -> Option<SharedResolver> {
        self.state
            .read()
            .container
            .as_ref()
            .and_then(|container| container.upgrade())
    }

    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.state.read().logger.clone()
    }

    /// 绑定提供者，返回被替换的旧提供者
    pub fn insert(&self, contract: Contract, provider: Provider) -> Option<Provider> {
        if let Some(logger) = self.logger() {
            logger.debug_with(
                json!({ "contract": contract.to_string(), "type": provider.kind().to_string() }),
                "绑定契约",
            );
        }
        self.providers.write().insert(contract, provider)
    }

    pub fn contains(&self, contract: &Contract) -> bool {
        self.providers.read().contains_key(contract)
    }

    pub fn get(&self, contract: &Contract) -> Option<Provider> {
        self.providers.read().get(contract).cloned()
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }

    /// 当前全部绑定的快照
    pub fn entries(&self) -> Vec<(Contract, Provider)> {
        self.providers
            .read()
            .iter()
            .map(|(contract, provider)| (contract.clone(), provider.clone()))
            .collect()
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.providers.read().iter())
            .finish()
    }
}

/// 模块 trait
///
/// 实现者只需提供 [`Module::bindings`]，并可在 `configure` 中追加绑定：
///
/// ```ignore
/// #[async_trait]
/// impl Module for AppModule {
///     fn bindings(&self) -> &Bindings {
///         &self.bindings
///     }
///
///     async fn configure(&self, options: ModuleOptions) -> DiResult<()> {
///         self.prepare(&options);
///         self.bind("config").to_value(AppConfig::default());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Module: AsAny {
    /// 模块的绑定表
    fn bindings(&self) -> &Bindings;

    /// 配置模块
    ///
    /// 每次调用都会重新登记提供者方法。
    async fn configure(&self, options: ModuleOptions) -> DiResult<()> {
        self.prepare(&options);
        Ok(())
    }

    /// 记录容器与日志记录器，并绑定本类型及其祖先上的提供者方法
    ///
    /// 派生类型上的同名方法会遮蔽祖先的方法。
    fn prepare(&self, options: &ModuleOptions) {
        let bindings = self.bindings();
        bindings.record(options);

        let type_info = self.type_info();
        if let Some(logger) = bindings.logger() {
            logger.debug_with(json!({ "module": type_info.name }), "配置模块");
        }

        let mut view: Option<Upcast> = None;
        let mut seen = HashSet::new();
        for ancestor in metadata::ancestry(&type_info) {
            if let Some(upcast) = ancestor.upcast {
                let composed: Upcast = match view.take() {
                    Some(previous) => {
                        Arc::new(move |scope: Scope| previous(scope).and_then(|scope| upcast(scope)))
                    }
                    None => upcast,
                };
                view = Some(composed);
            }

            for method in metadata::provided_methods(ancestor.type_info.id) {
                let name = match &method.target {
                    Target::Method { name, .. } => name.clone(),
                    _ => continue,
                };
                if !seen.insert(name) {
                    continue;
                }

                let factory = match &view {
                    Some(view) => method.factory.with_receiver(view.clone()),
                    None => method.factory.clone(),
                };
                for provided in method.provides {
                    bindings.insert(provided.contract, Provider::Factory(factory.clone()));
                }
            }
        }
    }

    /// 是否绑定了该契约
    fn has(&self, contract: &Contract) -> bool {
        let bindings = self.bindings();
        if let Some(logger) = bindings.logger() {
            logger.debug_with(json!({ "contract": contract.to_string() }), "在模块中查找契约");
        }
        bindings.contains(contract)
    }

    /// 契约的提供者
    fn get(&self, contract: &Contract) -> Option<Provider> {
        let bindings = self.bindings();
        let provider = bindings.get(contract);
        if let Some(logger) = bindings.logger() {
            logger.debug_with(
                json!({
                    "contract": contract.to_string(),
                    "provider": provider.as_ref().map(|provider| provider.to_string()),
                }),
                "从模块获取契约",
            );
        }
        provider
    }

    /// 绑定数量
    fn size(&self) -> usize {
        self.bindings().len()
    }

    /// 输出全部绑定
    fn debug(&self) -> DiResult<()> {
        let bindings = self.bindings();
        let logger = bindings
            .logger()
            .ok_or_else(|| DiError::logger_not_found("模块没有日志记录器"))?;

        logger.debug("module debug");
        for (contract, provider) in bindings.entries() {
            logger.debug_with(
                json!({ "contract": contract.to_string(), "provider": provider.to_string() }),
                "模块提供契约",
            );
        }
        Ok(())
    }

    /// 开始绑定一个契约
    fn bind(&self, contract: impl Into<Contract>) -> Binding<'_, Self>
    where
        Self: Sized,
    {
        Binding {
            module: self,
            contract: contract.into(),
        }
    }
}

/// 链式绑定
pub struct Binding<'a, M: Module> {
    module: &'a M,
    contract: Contract,
}

impl<'a, M: Module> Binding<'a, M> {
    /// 绑定任意提供者
    pub fn to_provider(self, provider: Provider) -> &'a M {
        self.module.bindings().insert(self.contract, provider);
        self.module
    }

    /// 绑定现成实例，每次解析返回同一个引用
    pub fn to_instance(self, instance: Value) -> &'a M {
        self.to_provider(Provider::Instance(instance))
    }

    pub fn to_value<T: Any + Send + Sync>(self, instance: T) -> &'a M {
        self.to_instance(Arc::new(instance))
    }

    pub fn to_constructor(self, constructor: Constructor) -> &'a M {
        self.to_provider(Provider::Constructor(constructor))
    }

    /// 绑定可注入类型的构造函数
    pub fn to_type<T: Injectable>(self) -> &'a M {
        self.to_constructor(Constructor::of::<T>())
    }

    pub fn to_factory(self, factory: Factory) -> &'a M {
        self.to_provider(Provider::Factory(factory))
    }
}
