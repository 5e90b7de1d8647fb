//! Centralized integration tests for di-impl crate
use async_trait::async_trait;
use di_abstractions::{
    inject, value, Bindings, Contract, Dependency, DiResult, ExtraArgs, Factory, Inject, Injectable,
    Injected, Module, ModuleOptions, Options, Provider, SharedResolver, Value,
};
use di_common::{DiError, DiSettings, ErrorKind, LogLevel, Logger, TracingLogger};
use di_impl::{construct_with_container, Container, ContainerOptions, MapModule};
use std::error::Error;
use std::sync::{Arc, Mutex, Once};

/// 记录每条日志消息
#[derive(Default)]
struct Recorder {
    lines: Mutex<Vec<String>>,
}

impl Recorder {
    fn count(&self) -> usize {
        self.lines.lock().map(|lines| lines.len()).unwrap_or(0)
    }
}

impl Logger for Recorder {
    fn log(&self, _level: LogLevel, _fields: Option<&serde_json::Value>, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

/// 无依赖的类型
struct Plain {
    values: usize,
    container: SharedResolver,
}

#[async_trait]
impl Injectable for Plain {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        Ok(Self {
            values: options.values().len(),
            container: options.container().clone(),
        })
    }
}

/// 依赖 "foo" 与 "bar"
struct Bar {
    foo: Arc<String>,
    bar: Arc<String>,
}

#[async_trait]
impl Injectable for Bar {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        Ok(Self {
            foo: options.require("foo")?,
            bar: options.require("bar")?,
        })
    }
}

/// 依次依赖 "foo"、"bar"、"baz"
struct Trio {
    values: Vec<String>,
}

#[async_trait]
impl Injectable for Trio {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        let mut values = Vec::new();
        for name in ["foo", "bar", "baz"] {
            values.push(options.require::<String>(name)?.as_ref().clone());
        }
        Ok(Self { values })
    }
}

/// 以 `x` 为键依赖 Plain
struct Holder {
    x: Arc<Plain>,
    container: SharedResolver,
    args: usize,
}

#[async_trait]
impl Injectable for Holder {
    async fn construct(options: Injected, args: ExtraArgs) -> DiResult<Self> {
        Ok(Self {
            x: options.require("x")?,
            container: options.container().clone(),
            args: args.len(),
        })
    }
}

/// 在构造函数中通过容器继续解析
struct Nested {
    foo: Arc<String>,
}

#[async_trait]
impl Injectable for Nested {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        let foo = options.container().create_as::<String>("foo").await?;
        Ok(Self { foo })
    }
}

/// 构造总是失败
struct Broken;

#[async_trait]
impl Injectable for Broken {
    async fn construct(_options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        Err(DiError::construction_failed(
            "Broken",
            std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
        ))
    }
}

fn register() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        inject::<Plain, [&str; 0]>([]).unwrap();
        inject::<Bar, _>(["foo", "bar"]).unwrap();
        inject::<Trio, _>(["foo", "bar", "baz"]).unwrap();
        Inject::<Holder>::new()
            .requires(Dependency::named("x", Contract::of::<Plain>()))
            .register()
            .unwrap();
        inject::<Nested, [&str; 0]>([]).unwrap();
        inject::<Broken, [&str; 0]>([]).unwrap();
    });
}

/// 记录 `has` 的每次调用
#[derive(Default)]
struct CountingModule {
    bindings: Bindings,
    asked: Mutex<Vec<Contract>>,
}

impl CountingModule {
    fn asked(&self) -> Vec<Contract> {
        self.asked.lock().map(|asked| asked.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Module for CountingModule {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    async fn configure(&self, options: ModuleOptions) -> DiResult<()> {
        self.prepare(&options);
        self.bind("foo")
            .to_value("foo".to_string())
            .bind("bar")
            .to_value("bar".to_string())
            .bind("baz")
            .to_value("baz".to_string());
        Ok(())
    }

    fn has(&self, contract: &Contract) -> bool {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(contract.clone());
        }
        self.bindings().contains(contract)
    }
}

/// 声称拥有一切却没有提供者
#[derive(Default)]
struct GreedyModule {
    bindings: Bindings,
}

impl Module for GreedyModule {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    fn has(&self, _contract: &Contract) -> bool {
        true
    }
}

/// 记录配置的开始与结束
struct OrderedModule {
    bindings: Bindings,
    name: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl OrderedModule {
    fn push(&self, event: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(format!("{} {}", self.name, event));
        }
    }
}

#[async_trait]
impl Module for OrderedModule {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    async fn configure(&self, options: ModuleOptions) -> DiResult<()> {
        self.push("start");
        tokio::task::yield_now().await;
        self.prepare(&options);
        self.push("end");
        Ok(())
    }
}

async fn configured(modules: Vec<Arc<dyn Module>>) -> Container {
    register();
    let container = Container::from_modules(modules);
    container
        .configure(ContainerOptions::default())
        .await
        .unwrap();
    container
}

#[tokio::test]
async fn test_has_false_means_get_none() {
    let module: Arc<dyn Module> = Arc::new(MapModule::new().with_value("foo", 1_u8));
    let container = configured(vec![module.clone()]).await;

    assert!(module.has(&Contract::from("foo")));
    assert!(!module.has(&Contract::from("missing")));
    assert!(module.get(&Contract::from("missing")).is_none());
    assert!(container.modules()[0].get(&Contract::from("foo")).is_some());
}

#[tokio::test]
async fn test_configure_once() {
    let container = Container::empty();
    let error = container.create("foo").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotBound);

    let configured = container
        .configure(ContainerOptions::default())
        .await
        .unwrap();
    assert!(configured.ptr_eq(&container));
    assert!(container.is_ready());

    let error = container
        .configure(ContainerOptions::default())
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::AlreadyBound);
}

#[tokio::test]
async fn test_named_type_dependency_gets_value_and_container() {
    let container = configured(Vec::new()).await;
    let holder = container
        .create_as::<Holder>(Contract::of::<Holder>())
        .await
        .unwrap();

    assert_eq!(holder.x.values, 0);
    assert!(container.is_same(&holder.container));
    assert!(container.is_same(&holder.x.container));
}

#[tokio::test]
async fn test_explicit_options_skip_module_lookup() {
    let module = Arc::new(CountingModule::default());
    let container = configured(vec![module.clone()]).await;

    let explicit = value("explicit".to_string());
    let bar = container
        .create_with(
            Some(Contract::of::<Bar>()),
            Options::new().with("bar", explicit.clone()),
            Vec::new(),
        )
        .await
        .unwrap();
    let bar = bar.downcast::<Bar>().unwrap();

    assert_eq!(bar.foo.as_str(), "foo");
    assert_eq!(bar.bar.as_str(), "explicit");

    let asked = module.asked();
    assert!(asked.contains(&Contract::from("foo")));
    assert!(!asked.contains(&Contract::from("bar")));
}

#[tokio::test]
async fn test_modules_configured_in_list_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let modules: Vec<Arc<dyn Module>> = ["first", "second"]
        .into_iter()
        .map(|name| {
            Arc::new(OrderedModule {
                bindings: Bindings::new(),
                name,
                events: events.clone(),
            }) as Arc<dyn Module>
        })
        .collect();
    configured(modules).await;

    let events = events.lock().unwrap().clone();
    assert_eq!(events, vec!["first start", "first end", "second start", "second end"]);
}

#[tokio::test]
async fn test_dependencies_resolved_in_declared_order() {
    let module = Arc::new(CountingModule::default());
    let container = configured(vec![module.clone()]).await;

    let trio = container
        .create_with(
            Some(Contract::of::<Trio>()),
            Options::new().with("bar", value("explicit".to_string())),
            Vec::new(),
        )
        .await
        .unwrap()
        .downcast::<Trio>()
        .unwrap();

    assert_eq!(trio.values, vec!["foo", "explicit", "baz"]);
    assert_eq!(
        module.asked(),
        vec![
            Contract::of::<Trio>(),
            Contract::from("foo"),
            Contract::from("baz"),
        ]
    );
}

#[tokio::test]
async fn test_instances_shared_constructors_fresh() {
    let shared = value("shared".to_string());
    let module = MapModule::new()
        .with_instance("instance", shared.clone())
        .with_type::<Plain>("plain");
    module.bind("factory").to_factory(Factory::new("make", |_options, _args| async {
        Ok(value(Vec::<u8>::new()))
    }));
    let container = configured(vec![Arc::new(module)]).await;

    let first = container.create("instance").await.unwrap();
    let second = container.create("instance").await.unwrap();
    assert!(Arc::ptr_eq(&first, &shared));
    assert!(Arc::ptr_eq(&first, &second));

    let first = container.create("plain").await.unwrap();
    let second = container.create("plain").await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    let first = container.create("factory").await.unwrap();
    let second = container.create("factory").await.unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_with_leaves_original_untouched() {
    let container = Container::from_modules(vec![Arc::new(MapModule::new())]);
    let extended = container.with(vec![Arc::new(MapModule::new()), Arc::new(MapModule::new())]);

    assert_eq!(container.modules().len(), 1);
    assert_eq!(extended.modules().len(), 3);
    assert!(!extended.is_ready());
    assert!(!extended.ptr_eq(&container));
}

#[tokio::test]
async fn test_foo_instance_injected_into_bar() {
    let module = MapModule::new()
        .with_value("foo", "foo instance".to_string())
        .with_value("bar", "bar instance".to_string());
    let container = configured(vec![Arc::new(module)]).await;

    let bar = container
        .create_as::<Bar>(Contract::of::<Bar>())
        .await
        .unwrap();
    assert_eq!(bar.foo.as_str(), "foo instance");
}

#[tokio::test]
async fn test_no_deps_type_gets_only_container() {
    let container = configured(Vec::new()).await;
    let plain = container
        .create_as::<Plain>(Contract::of::<Plain>())
        .await
        .unwrap();

    assert_eq!(plain.values, 0);
    assert!(container.is_same(&plain.container));
}

#[tokio::test]
async fn test_create_without_contract() {
    let container = configured(Vec::new()).await;
    let error = container
        .create_with(None, Options::new(), Vec::new())
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MissingValue);
}

#[tokio::test]
async fn test_unowned_unconstructible_contract() {
    let container = configured(vec![Arc::new(MapModule::new())]).await;
    let error = container.create("nobody").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MissingValue);
}

#[tokio::test]
async fn test_owning_module_without_provider() {
    let container = configured(vec![Arc::new(GreedyModule::default())]).await;
    let error = container.create("anything").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MissingValue);
}

#[tokio::test]
async fn test_none_provider_is_invalid() {
    let module = MapModule::new();
    module.bind("none").to_provider(Provider::None);
    let container = configured(vec![Arc::new(module)]).await;

    let error = container.create("none").await.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidProvider);
}

#[tokio::test]
async fn test_first_module_wins() {
    let first = MapModule::new().with_value("shared", 1_u8);
    let second = MapModule::new().with_value("shared", 2_u8);
    let container = configured(vec![Arc::new(first), Arc::new(second)]).await;

    let shared = container.create_as::<u8>("shared").await.unwrap();
    assert_eq!(*shared, 1);
}

#[tokio::test]
async fn test_extra_args_reach_constructor() {
    let container = configured(Vec::new()).await;
    let holder = container
        .create_with(
            Some(Contract::of::<Holder>()),
            Options::new(),
            vec![value(1_u8), value("two")],
        )
        .await
        .unwrap()
        .downcast::<Holder>()
        .unwrap();
    assert_eq!(holder.args, 2);
}

#[tokio::test]
async fn test_nested_resolution_through_injected_container() {
    let module = MapModule::new().with_value("foo", "nested".to_string());
    let container = configured(vec![Arc::new(module)]).await;

    let nested = container
        .create_as::<Nested>(Contract::of::<Nested>())
        .await
        .unwrap();
    assert_eq!(nested.foo.as_str(), "nested");
}

#[tokio::test]
async fn test_constructor_errors_propagate() {
    let container = configured(Vec::new()).await;
    let error = container.create(Contract::of::<Broken>()).await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ConstructionFailed);
    let source = error.source().map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("disk on fire"));
}

#[tokio::test]
async fn test_debug_logs_container_and_modules() {
    let recorder = Arc::new(Recorder::default());
    let module = MapModule::new().with_value("a", 1_u8).with_value("b", 2_u8);
    let container = Container::from_modules(vec![Arc::new(module)]);

    assert_eq!(container.debug().unwrap_err().kind(), ErrorKind::LoggerNotFound);

    container
        .configure(ContainerOptions::default().with_logger(recorder.clone()))
        .await
        .unwrap();

    let before = recorder.count();
    container.debug().unwrap();
    assert_eq!(recorder.count() - before, 4);
}

#[tokio::test]
async fn test_debug_without_logger_after_configure() {
    let container = configured(vec![Arc::new(MapModule::new())]).await;
    let error = container.debug().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::LoggerNotFound);
}

#[tokio::test]
async fn test_settings_drive_container() -> anyhow::Result<()> {
    register();
    let settings = DiSettings::from_toml_str(
        r#"
        [container]
        detect_cycles = false
        max_resolution_depth = 1

        [logging]
        level = "di=debug"
        "#,
    )?;
    di_common::init_tracing(&settings.logging)?;

    let container = Container::empty();
    container
        .configure(
            ContainerOptions::default()
                .with_config(settings.container)
                .with_logger(TracingLogger::shared()),
        )
        .await?;

    assert_eq!(container.config().max_resolution_depth, 1);
    let error = container
        .create(Contract::of::<Holder>())
        .await
        .err()
        .map(|error| error.kind());
    assert_eq!(error, Some(ErrorKind::ResolutionTooDeep));

    container.create(Contract::of::<Plain>()).await?;
    Ok(())
}

#[tokio::test]
async fn test_construct_with_container() {
    let module = MapModule::new().with_value("foo", "bound".to_string());
    let container = configured(vec![Arc::new(module)]).await;

    let bound = construct_with_container(&container, di_abstractions::Constructor::of::<Bar>());
    let built: Value = bound(
        Options::new()
            .with("foo", value("given".to_string()))
            .with("bar", value("bar".to_string())),
        Vec::new(),
    )
    .await
    .unwrap();
    let bar = built.downcast::<Bar>().unwrap();
    assert_eq!(bar.foo.as_str(), "given");

    let error = bound(Options::new(), Vec::new()).await.err().map(|error| error.kind());
    assert_eq!(error, Some(ErrorKind::MissingValue));

    let plain = construct_with_container(&container, di_abstractions::Constructor::of::<Plain>());
    let plain = plain(Options::new(), Vec::new()).await.unwrap().downcast::<Plain>().unwrap();
    assert!(container.is_same(&plain.container));
}
