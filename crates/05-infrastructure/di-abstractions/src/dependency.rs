//! 依赖声明与规范化

use crate::contract::{Contract, ContractName, Symbol};
use di_common::TypeInfo;

/// 规范化后的依赖：解析 `contract`，并以 `name` 为键放入注入选项
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub contract: Contract,
    pub name: ContractName,
}

impl Dependency {
    /// 以规范名称为键的依赖
    pub fn new(contract: impl Into<Contract>) -> Self {
        let contract = contract.into();
        let name = contract.name();
        Self { contract, name }
    }

    /// 显式命名的依赖
    pub fn named(name: impl Into<ContractName>, contract: impl Into<Contract>) -> Self {
        Self {
            contract: contract.into(),
            name: name.into(),
        }
    }
}

/// 注解中书写的依赖：裸契约或已命名的依赖
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedDependency {
    Contract(Contract),
    Dependency(Dependency),
}

impl From<Dependency> for InjectedDependency {
    fn from(dependency: Dependency) -> Self {
        Self::Dependency(dependency)
    }
}

impl From<Contract> for InjectedDependency {
    fn from(contract: Contract) -> Self {
        Self::Contract(contract)
    }
}

impl From<&Contract> for InjectedDependency {
    fn from(contract: &Contract) -> Self {
        Self::Contract(contract.clone())
    }
}

impl From<&str> for InjectedDependency {
    fn from(name: &str) -> Self {
        Self::Contract(Contract::from(name))
    }
}

impl From<String> for InjectedDependency {
    fn from(name: String) -> Self {
        Self::Contract(Contract::from(name))
    }
}

impl From<Symbol> for InjectedDependency {
    fn from(symbol: Symbol) -> Self {
        Self::Contract(Contract::from(symbol))
    }
}

impl From<&Symbol> for InjectedDependency {
    fn from(symbol: &Symbol) -> Self {
        Self::Contract(Contract::from(symbol))
    }
}

impl From<TypeInfo> for InjectedDependency {
    fn from(info: TypeInfo) -> Self {
        Self::Contract(Contract::Type(info))
    }
}

impl InjectedDependency {
    /// 转换为规范化的依赖
    pub fn resolve(self) -> Dependency {
        match self {
            Self::Dependency(dependency) => dependency,
            Self::Contract(contract) => Dependency::new(contract),
        }
    }
}

/// 将注解中的依赖列表规范化，顺序与输入一一对应
pub fn resolve_depends<I>(deps: I) -> Vec<Dependency>
where
    I: IntoIterator,
    I::Item: Into<InjectedDependency>,
{
    deps.into_iter().map(|dep| dep.into().resolve()).collect()
}
