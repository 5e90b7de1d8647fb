//! 模块提供者方法的集成测试
use async_trait::async_trait;
use di_abstractions::{
    extends_via, get_provides, inject_method, provides, value, Bindings, Contract, DiResult,
    Injected, Module, ModuleOptions, Target,
};
use di_impl::{Container, ContainerOptions, MapModule};
use std::sync::{Arc, Once};

/// 通过提供者方法提供问候语
struct GreetingModule {
    bindings: Bindings,
    prefix: String,
}

impl Module for GreetingModule {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

/// 复用 GreetingModule 的提供者方法
struct AppModule {
    bindings: Bindings,
    greeting: Arc<GreetingModule>,
}

#[async_trait]
impl Module for AppModule {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    async fn configure(&self, options: ModuleOptions) -> DiResult<()> {
        self.prepare(&options);
        self.bind("name").to_value("app".to_string());
        Ok(())
    }
}

fn register() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        provides::<GreetingModule, _, _, _>(
            "greeting",
            ["greeting", "salutation"],
            |module: Arc<GreetingModule>, options: Injected, _args| async move {
                let name = options.require::<String>("name")?;
                Ok(value(format!("{} {}", module.prefix, name)))
            },
        )
        .unwrap();
        inject_method::<GreetingModule, _>("greeting", ["name"]).unwrap();
        extends_via::<AppModule, GreetingModule, _>(|app: Arc<AppModule>| app.greeting.clone())
            .unwrap();
    });
}

fn greeting_module(prefix: &str) -> GreetingModule {
    GreetingModule {
        bindings: Bindings::new(),
        prefix: prefix.to_string(),
    }
}

#[tokio::test]
async fn test_provider_method_bound_for_each_contract() {
    register();
    let names = MapModule::new().with_value("name", "world".to_string());
    let modules: Vec<Arc<dyn Module>> = vec![Arc::new(greeting_module("hello")), Arc::new(names)];
    let container = Container::from_modules(modules);
    container
        .configure(ContainerOptions::default())
        .await
        .unwrap();

    assert_eq!(container.modules()[0].size(), 2);
    let greeting = container.create_as::<String>("greeting").await.unwrap();
    assert_eq!(greeting.as_str(), "hello world");

    let salutation = container.create_as::<String>("salutation").await.unwrap();
    assert_eq!(salutation.as_str(), "hello world");
    assert!(!Arc::ptr_eq(&greeting, &salutation));

    let contracts = get_provides(&Target::method::<GreetingModule>("greeting"));
    assert_eq!(contracts.len(), 2);
    assert_eq!(contracts[0].contract, Contract::from("greeting"));
}

#[tokio::test]
async fn test_inherited_provider_method_uses_upcast_receiver() {
    register();
    let app = AppModule {
        bindings: Bindings::new(),
        greeting: Arc::new(greeting_module("hi")),
    };
    let container = Container::from_modules(vec![Arc::new(app)]);
    container
        .configure(ContainerOptions::default())
        .await
        .unwrap();

    assert_eq!(container.modules()[0].size(), 3);
    let greeting = container.create_as::<String>("greeting").await.unwrap();
    assert_eq!(greeting.as_str(), "hi app");
}

#[tokio::test]
async fn test_repeated_configure_rebinds() {
    register();
    let module = greeting_module("again");
    let container = Container::empty();
    let options = ModuleOptions {
        container: container.as_resolver(),
        logger: None,
    };

    module.configure(options.clone()).await.unwrap();
    module.configure(options).await.unwrap();
    assert_eq!(module.size(), 2);
}
