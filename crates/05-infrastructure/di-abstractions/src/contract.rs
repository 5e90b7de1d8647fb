//! 契约标识
//!
//! 契约是可以向容器请求的事物的标识：名称、进程内唯一符号或具体类型。

use di_common::TypeInfo;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// 进程内唯一的符号
///
/// 两个描述相同的符号互不相等。
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    /// 创建新的符号
    pub fn new(description: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description: Arc::from(description.as_ref()),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.description, self.id)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// 契约名称，也是注入选项中的属性键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContractName {
    Str(String),
    Symbol(Symbol),
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(name) => f.write_str(name),
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
        }
    }
}

impl From<&str> for ContractName {
    fn from(name: &str) -> Self {
        Self::Str(name.to_string())
    }
}

impl From<String> for ContractName {
    fn from(name: String) -> Self {
        Self::Str(name)
    }
}

impl From<Symbol> for ContractName {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&Symbol> for ContractName {
    fn from(symbol: &Symbol) -> Self {
        Self::Symbol(symbol.clone())
    }
}

/// 契约
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Contract {
    /// 字符串名称
    Name(String),
    /// 唯一符号
    Symbol(Symbol),
    /// 具体类型
    Type(TypeInfo),
}

impl Contract {
    /// 类型契约
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    /// 名称契约
    pub fn named(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// 规范名称：类型取其短名称，名称与符号取自身
    pub fn name(&self) -> ContractName {
        match self {
            Self::Name(name) => ContractName::Str(name.clone()),
            Self::Symbol(symbol) => ContractName::Symbol(symbol.clone()),
            Self::Type(info) => ContractName::Str(info.short_name().to_string()),
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Self::Type(info) => Some(info.id),
            _ => None,
        }
    }

    pub fn type_info(&self) -> Option<&TypeInfo> {
        match self {
            Self::Type(info) => Some(info),
            _ => None,
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Symbol(symbol) => fmt::Display::fmt(symbol, f),
            Self::Type(info) => write!(f, "{}", info.module_path),
        }
    }
}

impl From<&str> for Contract {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Contract {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Symbol> for Contract {
    fn from(symbol: Symbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<&Symbol> for Contract {
    fn from(symbol: &Symbol) -> Self {
        Self::Symbol(symbol.clone())
    }
}

impl From<TypeInfo> for Contract {
    fn from(info: TypeInfo) -> Self {
        Self::Type(info)
    }
}

impl From<&Contract> for Contract {
    fn from(contract: &Contract) -> Self {
        contract.clone()
    }
}
