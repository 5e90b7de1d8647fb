//! 依赖注入容器
//!
//! 容器按顺序询问模块能否提供某个契约，解析构造函数或工厂声明的依赖，
//! 并把解析结果与调用方的显式选项合并后交给提供者。

use async_trait::async_trait;
use di_abstractions::metadata;
use di_abstractions::{
    downcast, AsAny, Constructor, Contract, Dependency, ExtraArgs, Factory, Injected, Module, ModuleOptions,
    Options, Provider, Resolver, Scope, SharedResolver, Value,
};
use di_common::{ContainerConfig, DiError, DiResult, Logger};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use serde_json::json;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::instrument;

/// 容器配置选项
#[derive(Clone, Default)]
pub struct ContainerOptions {
    /// 容器与模块使用的日志记录器，为空时 `debug` 返回 `LoggerNotFound`
    pub logger: Option<Arc<dyn Logger>>,
    pub config: ContainerConfig,
}

impl ContainerOptions {
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for ContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerOptions")
            .field("logger", &self.logger.is_some())
            .field("config", &self.config)
            .finish()
    }
}

struct ContainerState {
    logger: Option<Arc<dyn Logger>>,
    config: ContainerConfig,
}

/// 解析链，记录当前路径上正在解析的契约
type Chain = Vec<Contract>;

struct ContainerInner {
    this: Weak<ContainerInner>,
    modules: Vec<Arc<dyn Module>>,
    ready: AtomicBool,
    state: RwLock<ContainerState>,
}

/// 依赖注入容器
///
/// 克隆得到的是同一个容器的句柄。
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

impl Container {
    /// 由模块列表创建未配置的容器
    pub fn from_modules(modules: Vec<Arc<dyn Module>>) -> Self {
        let inner = Arc::new_cyclic(|this| ContainerInner {
            this: this.clone(),
            modules,
            ready: AtomicBool::new(false),
            state: RwLock::new(ContainerState {
                logger: None,
                config: ContainerConfig::default(),
            }),
        });
        Self { inner }
    }

    /// 不含模块的容器
    pub fn empty() -> Self {
        Self::from_modules(Vec::new())
    }

    /// 配置容器及其全部模块
    ///
    /// 每个容器只能配置一次，模块按顺序逐个配置。
    #[instrument(skip_all)]
    pub async fn configure(&self, options: ContainerOptions) -> DiResult<Container> {
        {
            let mut state = self.inner.state.write();
            if self.inner.ready.load(Ordering::Acquire) {
                return Err(DiError::already_bound("容器已经配置过"));
            }
            state.logger = options.logger.clone();
            state.config = options.config;
            self.inner.ready.store(true, Ordering::Release);
        }

        let container = self.as_resolver();
        for module in &self.inner.modules {
            module
                .configure(ModuleOptions {
                    container: container.clone(),
                    logger: options.logger.clone(),
                })
                .await?;
        }

        if let Some(logger) = self.logger() {
            logger.debug_with(json!({ "modules": self.inner.modules.len() }), "容器配置完成");
        }
        Ok(self.clone())
    }

    /// 不带显式选项解析契约
    pub async fn create(&self, contract: impl Into<Contract>) -> DiResult<Value> {
        self.create_with(Some(contract.into()), Options::new(), Vec::new())
            .await
    }

    /// 解析契约
    ///
    /// `options` 中已有的依赖名称不会再向模块请求，`args` 原样追加给提供者。
    pub async fn create_with(
        &self,
        contract: Option<Contract>,
        options: Options,
        args: ExtraArgs,
    ) -> DiResult<Value> {
        self.inner.resolve(contract, options, args, Chain::new()).await
    }

    /// 解析并向下转型
    pub async fn create_as<T: Any + Send + Sync>(&self, contract: impl Into<Contract>) -> DiResult<Arc<T>> {
        let contract = contract.into();
        let value = self.create(contract.clone()).await?;
        downcast(value, &contract)
    }

    /// 使用模块的提供者满足契约
    pub async fn provide(
        &self,
        module: &Arc<dyn Module>,
        contract: &Contract,
        options: Options,
        args: ExtraArgs,
    ) -> DiResult<Value> {
        self.inner.check_ready()?;
        self.inner
            .provide(module, contract, options, args, Chain::new())
            .await
    }

    /// 解析构造函数的依赖并调用
    pub async fn construct(
        &self,
        constructor: &Constructor,
        options: Options,
        args: ExtraArgs,
    ) -> DiResult<Value> {
        self.inner.check_ready()?;
        self.inner
            .construct(constructor, options, args, Chain::new())
            .await
    }

    /// 解析工厂的依赖并以 `scope` 为接收者调用
    pub async fn apply(
        &self,
        factory: &Factory,
        scope: Scope,
        options: Options,
        args: ExtraArgs,
    ) -> DiResult<Value> {
        self.inner.check_ready()?;
        self.inner
            .apply(factory, scope, options, args, Chain::new())
            .await
    }

    /// 输出容器与各模块的绑定
    pub fn debug(&self) -> DiResult<()> {
        let logger = self
            .logger()
            .ok_or_else(|| DiError::logger_not_found("容器没有日志记录器"))?;

        logger.debug_with(
            json!({ "ready": self.is_ready(), "modules": self.inner.modules.len() }),
            "container debug",
        );
        for module in &self.inner.modules {
            module.debug()?;
        }
        Ok(())
    }

    pub fn modules(&self) -> &[Arc<dyn Module>] {
        &self.inner.modules
    }

    /// 追加模块得到新的未配置容器，原容器不受影响
    pub fn with(&self, modules: Vec<Arc<dyn Module>>) -> Container {
        let mut merged = self.inner.modules.clone();
        merged.extend(modules);
        Self::from_modules(merged)
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.load(Ordering::Acquire)
    }

    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.inner.state.read().logger.clone()
    }

    pub fn config(&self) -> ContainerConfig {
        self.inner.config()
    }

    /// 以解析器接口共享本容器
    pub fn as_resolver(&self) -> SharedResolver {
        self.inner.clone()
    }

    /// 从注入选项携带的解析器还原容器
    pub fn from_resolver(resolver: &SharedResolver) -> Option<Container> {
        Resolver::as_any(resolver.as_ref())
            .downcast_ref::<ContainerInner>()
            .and_then(|inner| inner.this.upgrade())
            .map(|inner| Container { inner })
    }

    /// 是否为同一个容器
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// 解析器是否指向本容器
    pub fn is_same(&self, resolver: &SharedResolver) -> bool {
        di_abstractions::same_resolver(&self.as_resolver(), resolver)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("ready", &self.is_ready())
            .field("modules", &self.inner.modules.len())
            .finish()
    }
}

impl ContainerInner {
    fn check_ready(&self) -> DiResult<()> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DiError::not_bound("容器尚未配置"))
        }
    }

    fn config(&self) -> ContainerConfig {
        self.state.read().config.clone()
    }

    fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.state.read().logger.clone()
    }

    fn resolver(&self) -> DiResult<SharedResolver> {
        match self.this.upgrade() {
            Some(inner) => Ok(inner),
            None => Err(DiError::not_bound("容器已释放")),
        }
    }

    fn resolve(
        &self,
        contract: Option<Contract>,
        options: Options,
        args: ExtraArgs,
        mut chain: Chain,
    ) -> BoxFuture<'_, DiResult<Value>> {
        async move {
            self.check_ready()?;
            let contract =
                contract.ok_or_else(|| DiError::missing_value("未指定要解析的契约"))?;

            let config = self.config();
            if config.detect_cycles && chain.contains(&contract) {
                chain.push(contract);
                return Err(DiError::CyclicDependency {
                    chain: render_chain(&chain),
                });
            }
            if chain.len() >= config.max_resolution_depth {
                chain.push(contract);
                return Err(DiError::ResolutionTooDeep {
                    limit: config.max_resolution_depth,
                    chain: render_chain(&chain),
                });
            }
            chain.push(contract.clone());

            if let Some(logger) = self.logger() {
                logger.debug_with(json!({ "contract": contract.to_string() }), "解析契约");
            }

            for module in &self.modules {
                if module.has(&contract) {
                    return self.provide(module, &contract, options, args, chain).await;
                }
            }

            let constructor = contract.type_id().and_then(metadata::constructor_for);
            match constructor {
                Some(constructor) => self.construct(&constructor, options, args, chain).await,
                None => Err(DiError::missing_value(format!(
                    "没有模块提供契约 {}，且它不可构造",
                    contract
                ))),
            }
        }
        .boxed()
    }

    async fn provide(
        &self,
        module: &Arc<dyn Module>,
        contract: &Contract,
        options: Options,
        args: ExtraArgs,
        chain: Chain,
    ) -> DiResult<Value> {
        let provider = module.get(contract).ok_or_else(|| {
            DiError::missing_value(format!("模块没有契约 {} 的提供者", contract))
        })?;

        match provider {
            Provider::Constructor(constructor) => {
                self.construct(&constructor, options, args, chain).await
            }
            Provider::Factory(factory) => {
                let scope = AsAny::into_any(module.clone());
                self.apply(&factory, scope, options, args, chain).await
            }
            Provider::Instance(instance) => Ok(instance),
            Provider::None => Err(DiError::invalid_provider(format!(
                "契约 {} 的提供者类型无效",
                contract
            ))),
        }
    }

    async fn construct(
        &self,
        constructor: &Constructor,
        options: Options,
        args: ExtraArgs,
        chain: Chain,
    ) -> DiResult<Value> {
        if let Some(logger) = self.logger() {
            logger.debug_with(
                json!({ "constructor": constructor.type_info().name }),
                "构造实例",
            );
        }
        let deps = metadata::read(&constructor.target());
        let injected = self.dependencies(deps, options, chain).await?;
        constructor.invoke(injected, args).await
    }

    async fn apply(
        &self,
        factory: &Factory,
        scope: Scope,
        options: Options,
        args: ExtraArgs,
        chain: Chain,
    ) -> DiResult<Value> {
        if let Some(logger) = self.logger() {
            logger.debug_with(json!({ "factory": factory.target().to_string() }), "调用工厂");
        }
        let deps = metadata::read(factory.target());
        let injected = self.dependencies(deps, options, chain).await?;
        factory.invoke(scope, injected, args).await
    }

    /// 逐个解析依赖，显式选项中已有的名称跳过，最后覆盖显式选项并附上容器
    async fn dependencies(
        &self,
        deps: Vec<Dependency>,
        options: Options,
        chain: Chain,
    ) -> DiResult<Injected> {
        let mut values = Options::new();
        for dependency in deps {
            if options.contains_key(&dependency.name) {
                continue;
            }
            let value = self
                .resolve(
                    Some(dependency.contract),
                    Options::new(),
                    Vec::new(),
                    chain.clone(),
                )
                .await?;
            values.insert(dependency.name, value);
        }
        values.merge(options);
        Ok(Injected::new(values, self.resolver()?))
    }
}

#[async_trait]
impl Resolver for ContainerInner {
    async fn create_with(
        &self,
        contract: Option<Contract>,
        options: Options,
        args: ExtraArgs,
    ) -> DiResult<Value> {
        self.resolve(contract, options, args, Chain::new()).await
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn render_chain(chain: &[Contract]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
