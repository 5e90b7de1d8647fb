//! 字段注入的集成测试
use async_trait::async_trait;
use di_abstractions::{
    extends, field, inject_fields, value, Contract, DiError, DiResult, ExtraArgs, Factory,
    FieldTarget, FromFieldValue, Inject, Injectable, Injected, Module, Symbol, Value,
};
use di_common::ErrorKind;
use di_impl::{Container, ContainerOptions, MapModule};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static NUMBER: Lazy<Symbol> = Lazy::new(|| Symbol::new("number"));

/// 字段名与契约名不同
#[derive(Default)]
struct Target {
    bar: Option<Arc<u32>>,
}

impl FieldTarget for Target {
    fn set_field(&mut self, key: &str, value: Value) -> DiResult<()> {
        match key {
            "bar" => {
                self.bar = FromFieldValue::from_field_value(key, value)?;
                Ok(())
            }
            _ => Err(DiError::invalid_target(key.to_string())),
        }
    }
}

#[async_trait]
impl Injectable for Target {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        let mut target = Target::default();
        inject_fields(&mut target, options.values())?;
        Ok(target)
    }
}

/// 父类型声明字段
#[derive(Default)]
struct Base {
    greeting: Option<Arc<String>>,
}

impl FieldTarget for Base {
    fn set_field(&mut self, key: &str, value: Value) -> DiResult<()> {
        match key {
            "greeting" => {
                self.greeting = FromFieldValue::from_field_value(key, value)?;
                Ok(())
            }
            _ => Err(DiError::invalid_target(key.to_string())),
        }
    }
}

#[async_trait]
impl Injectable for Base {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        let mut base = Base::default();
        inject_fields(&mut base, options.values())?;
        Ok(base)
    }
}

/// 继承父类型的字段
#[derive(Default)]
struct Derived {
    base: Base,
}

impl FieldTarget for Derived {
    fn set_field(&mut self, key: &str, value: Value) -> DiResult<()> {
        self.base.set_field(key, value)
    }
}

#[async_trait]
impl Injectable for Derived {
    async fn construct(options: Injected, _args: ExtraArgs) -> DiResult<Self> {
        let mut derived = Derived::default();
        inject_fields(&mut derived, options.values())?;
        Ok(derived)
    }
}

fn register() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        field::<Target>("bar", &*NUMBER).unwrap();
        Inject::<Target>::new().with_fields().register().unwrap();

        extends::<Derived, Base>().unwrap();
        field::<Base>("greeting", "greeting").unwrap();
        Inject::<Base>::new().with_fields().register().unwrap();
        Inject::<Derived>::new().with_fields().register().unwrap();
    });
}

async fn configured(module: MapModule) -> Container {
    register();
    let container = Container::from_modules(vec![Arc::new(module)]);
    container
        .configure(ContainerOptions::default())
        .await
        .unwrap();
    container
}

#[tokio::test]
async fn test_field_resolved_by_symbol_contract() {
    let container = configured(MapModule::new().with_value(&*NUMBER, 4_u32)).await;

    let target = container
        .create_as::<Target>(Contract::of::<Target>())
        .await
        .unwrap();
    assert_eq!(target.bar.as_deref(), Some(&4));
}

#[tokio::test]
async fn test_missing_field_contract() {
    let container = configured(MapModule::new()).await;

    let error = container
        .create(Contract::of::<Target>())
        .await
        .err()
        .map(|error| error.kind());
    assert_eq!(error, Some(ErrorKind::MissingValue));
}

#[tokio::test]
async fn test_inherited_field_resolved_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let module = MapModule::new();
    module
        .bind("greeting")
        .to_factory(Factory::new("greeting", move |_options, _args| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(value("hello".to_string())) }
        }));
    let container = configured(module).await;

    let derived = container
        .create_as::<Derived>(Contract::of::<Derived>())
        .await
        .unwrap();
    assert_eq!(derived.base.greeting.as_deref().map(String::as_str), Some("hello"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
