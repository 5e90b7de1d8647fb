//! 基于映射表的参考模块

use async_trait::async_trait;
use di_abstractions::{
    Bindings, Constructor, Contract, DiResult, Injectable, Module, ModuleOptions, Value,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

/// 映射表中的提供者
#[derive(Clone)]
pub enum MapValue {
    Instance(Value),
    Constructor(Constructor),
}

impl From<Constructor> for MapValue {
    fn from(constructor: Constructor) -> Self {
        Self::Constructor(constructor)
    }
}

/// 从契约到实例或构造函数的映射提供依赖
///
/// 映射在 `configure` 时按插入顺序绑定，之后也会绑定类型上登记的提供者方法。
#[derive(Default)]
pub struct MapModule {
    bindings: Bindings,
    providers: Vec<(Contract, MapValue)>,
}

impl MapModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有映射创建
    pub fn from_map<I, C>(providers: I) -> Self
    where
        I: IntoIterator<Item = (C, MapValue)>,
        C: Into<Contract>,
    {
        Self {
            bindings: Bindings::new(),
            providers: providers
                .into_iter()
                .map(|(contract, value)| (contract.into(), value))
                .collect(),
        }
    }

    pub fn with_instance(mut self, contract: impl Into<Contract>, instance: Value) -> Self {
        self.providers
            .push((contract.into(), MapValue::Instance(instance)));
        self
    }

    pub fn with_value<T: Any + Send + Sync>(self, contract: impl Into<Contract>, instance: T) -> Self {
        self.with_instance(contract, Arc::new(instance))
    }

    pub fn with_constructor(mut self, contract: impl Into<Contract>, constructor: Constructor) -> Self {
        self.providers
            .push((contract.into(), MapValue::Constructor(constructor)));
        self
    }

    pub fn with_type<T: Injectable>(self, contract: impl Into<Contract>) -> Self {
        self.with_constructor(contract, Constructor::of::<T>())
    }
}

#[async_trait]
impl Module for MapModule {
    fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    async fn configure(&self, options: ModuleOptions) -> DiResult<()> {
        self.prepare(&options);

        for (contract, value) in &self.providers {
            if let Some(logger) = self.bindings.logger() {
                logger.debug_with(json!({ "contract": contract.to_string() }), "绑定映射提供者");
            }

            match value {
                MapValue::Instance(instance) => {
                    self.bind(contract).to_instance(instance.clone());
                }
                MapValue::Constructor(constructor) => {
                    self.bind(contract).to_constructor(constructor.clone());
                }
            }
        }
        Ok(())
    }
}
