//! 注入选项
//!
//! [`Options`] 是调用方显式传入的值，[`Injected`] 是解析完成后交给构造函数
//! 或工厂的完整选项，始终携带所属容器。

use crate::contract::ContractName;
use crate::resolver::SharedResolver;
use di_common::{DiError, DiResult};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 类型擦除的值，引用相等即同一实例
pub type Value = Arc<dyn Any + Send + Sync>;

/// 追加在选项之后的位置参数
pub type ExtraArgs = Vec<Value>;

/// 包装任意值
pub fn value<T: Any + Send + Sync>(inner: T) -> Value {
    Arc::new(inner)
}

/// 将值向下转型为具体类型
pub fn downcast<T: Any + Send + Sync>(value: Value, name: &dyn fmt::Display) -> DiResult<Arc<T>> {
    value.downcast::<T>().map_err(|_| {
        DiError::missing_value(format!(
            "值 {} 不是期望的类型 {}",
            name,
            std::any::type_name::<T>()
        ))
    })
}

/// 以契约名称为键的值集合
#[derive(Clone, Default)]
pub struct Options {
    values: HashMap<ContractName, Value>,
}

impl Options {
    /// 创建空选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式插入
    pub fn with(mut self, name: impl Into<ContractName>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// 插入值，返回被替换的旧值
    pub fn insert(&mut self, name: impl Into<ContractName>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    pub fn get(&self, name: impl Into<ContractName>) -> Option<Value> {
        self.values.get(&name.into()).cloned()
    }

    pub fn get_as<T: Any + Send + Sync>(&self, name: impl Into<ContractName>) -> Option<Arc<T>> {
        self.get(name).and_then(|value| value.downcast::<T>().ok())
    }

    pub fn contains_key(&self, name: &ContractName) -> bool {
        self.values.contains_key(name)
    }

    /// 用 `other` 覆盖当前值
    pub fn merge(&mut self, other: Options) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ContractName> {
        self.values.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContractName, &Value)> {
        self.values.iter()
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// 交给构造函数与工厂的完整选项
#[derive(Clone)]
pub struct Injected {
    values: Options,
    container: SharedResolver,
}

impl Injected {
    pub fn new(values: Options, container: SharedResolver) -> Self {
        Self { values, container }
    }

    /// 构建本对象的容器
    pub fn container(&self) -> &SharedResolver {
        &self.container
    }

    pub fn values(&self) -> &Options {
        &self.values
    }

    pub fn get(&self, name: impl Into<ContractName>) -> Option<Value> {
        self.values.get(name)
    }

    pub fn get_as<T: Any + Send + Sync>(&self, name: impl Into<ContractName>) -> Option<Arc<T>> {
        self.values.get_as(name)
    }

    /// 获取必需的依赖，缺失或类型不符时返回 `MissingValue`
    pub fn require<T: Any + Send + Sync>(&self, name: impl Into<ContractName>) -> DiResult<Arc<T>> {
        let name = name.into();
        let value = self
            .values
            .get(name.clone())
            .ok_or_else(|| DiError::missing_value(format!("注入选项缺少依赖: {}", name)))?;
        downcast(value, &name)
    }

    pub fn contains_key(&self, name: &ContractName) -> bool {
        self.values.contains_key(name)
    }

    pub fn into_parts(self) -> (Options, SharedResolver) {
        (self.values, self.container)
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injected")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
