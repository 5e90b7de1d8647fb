//! 依赖元数据存储
//!
//! 进程级的旁路表，以声明（类型、函数或方法）为键保存依赖列表、
//! 提供者方法、字段绑定和构造函数。Rust 没有运行时继承，类型之间的
//! 父子关系需要通过 [`extends`] 显式声明，读取时沿父链逐级回退。

use crate::dependency::Dependency;
use crate::provider::{Constructor, Factory, Scope};
use di_common::{DiError, DiResult, TypeInfo};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_FUNCTION: AtomicU64 = AtomicU64::new(1);

/// 独立函数的标识
#[derive(Clone)]
pub struct FunctionId {
    id: u64,
    name: Arc<str>,
}

impl FunctionId {
    /// 分配新的函数标识
    pub fn new(name: &str) -> Self {
        Self {
            id: NEXT_FUNCTION.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for FunctionId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FunctionId {}

impl Hash for FunctionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionId({}#{})", self.name, self.id)
    }
}

/// 元数据所附着的声明
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// 类型（构造函数级别）
    Type(TypeInfo),
    /// 独立函数
    Function(FunctionId),
    /// 类型上的具名方法
    Method { owner: TypeInfo, name: String },
}

impl Target {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    pub fn method<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::Method {
            owner: TypeInfo::of::<T>(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(info) => write!(f, "{}", info),
            Self::Function(id) => write!(f, "fn {}", id.name()),
            Self::Method { owner, name } => write!(f, "{}::{}", owner, name),
        }
    }
}

/// 类型成员种类，用于注解的描述符检查
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Field,
    Method,
}

/// 将子类型实例视为父类型实例
pub type Upcast = Arc<dyn Fn(Scope) -> Option<Scope> + Send + Sync>;

#[derive(Clone)]
struct ParentLink {
    parent: TypeInfo,
    upcast: Option<Upcast>,
}

#[derive(Default)]
struct TypeRecord {
    parent: Option<ParentLink>,
    constructor: Option<Constructor>,
    members: HashMap<String, MemberKind>,
}

#[derive(Clone)]
struct Requirements {
    inherit: bool,
    deps: Vec<Dependency>,
}

/// 注册在类型上的提供者方法
#[derive(Debug, Clone)]
pub struct ProvidedMethod {
    /// 方法声明
    pub target: Target,
    /// 该方法能提供的契约
    pub provides: Vec<Dependency>,
    /// 调用该方法的工厂
    pub factory: Factory,
}

/// 祖先链上的一级
#[derive(Clone)]
pub struct Ancestor {
    pub type_info: TypeInfo,
    /// 从上一级视图转换到本级的函数，根节点为 `None`
    pub upcast: Option<Upcast>,
}

impl fmt::Debug for Ancestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ancestor")
            .field("type_info", &self.type_info)
            .field("upcast", &self.upcast.is_some())
            .finish()
    }
}

#[derive(Default)]
struct MetadataStore {
    types: HashMap<TypeId, TypeRecord>,
    requires: HashMap<Target, Requirements>,
    provides: HashMap<Target, ProvidedMethod>,
    fields: HashMap<TypeId, Vec<Dependency>>,
    with_fields: HashSet<TypeId>,
}

static STORE: Lazy<RwLock<MetadataStore>> = Lazy::new(|| RwLock::new(MetadataStore::default()));

impl MetadataStore {
    fn parent_of(&self, type_id: TypeId) -> Option<&ParentLink> {
        self.types.get(&type_id).and_then(|record| record.parent.as_ref())
    }

    fn parent_target(&self, target: &Target) -> Option<Target> {
        match target {
            Target::Type(info) => self
                .parent_of(info.id)
                .map(|link| Target::Type(link.parent.clone())),
            Target::Method { owner, name } => self.parent_of(owner.id).map(|link| Target::Method {
                owner: link.parent.clone(),
                name: name.clone(),
            }),
            Target::Function(_) => None,
        }
    }

    fn member_kind(&self, owner: TypeId, name: &str) -> Option<MemberKind> {
        self.types
            .get(&owner)
            .and_then(|record| record.members.get(name).copied())
    }

    fn check_target(&self, target: &Target) -> DiResult<()> {
        if let Target::Method { owner, name } = target {
            if self.member_kind(owner.id, name) == Some(MemberKind::Field) {
                return Err(DiError::invalid_target(format!(
                    "{}::{} 是字段而不是方法",
                    owner, name
                )));
            }
        }
        Ok(())
    }

    fn read(&self, target: &Target) -> Vec<Dependency> {
        let mut deps = self.read_requires(target);
        if let Target::Type(info) = target {
            if self.requires_fields(info.id) {
                // 字段值按契约的规范名称存放，与 inject_fields 的取值方式一致
                deps.extend(
                    self.read_fields(info.id)
                        .into_iter()
                        .map(|field| Dependency::new(field.contract)),
                );
            }
        }
        deps
    }

    fn read_requires(&self, target: &Target) -> Vec<Dependency> {
        match self.requires.get(target) {
            Some(own) if own.inherit => {
                let mut deps = self
                    .parent_target(target)
                    .map(|parent| self.read_requires(&parent))
                    .unwrap_or_default();
                deps.extend(own.deps.iter().cloned());
                deps
            }
            Some(own) => own.deps.clone(),
            None => self
                .parent_target(target)
                .map(|parent| self.read_requires(&parent))
                .unwrap_or_default(),
        }
    }

    fn requires_fields(&self, type_id: TypeId) -> bool {
        let mut current = Some(type_id);
        while let Some(id) = current {
            if self.with_fields.contains(&id) {
                return true;
            }
            current = self.parent_of(id).map(|link| link.parent.id);
        }
        false
    }

    fn write(&mut self, target: &Target, deps: Vec<Dependency>, inherit: bool) -> DiResult<()> {
        self.check_target(target)?;
        let entry = self
            .requires
            .entry(target.clone())
            .or_insert_with(|| Requirements {
                inherit,
                deps: Vec::new(),
            });
        entry.inherit |= inherit;
        entry.deps.extend(deps);
        Ok(())
    }

    fn read_fields(&self, type_id: TypeId) -> Vec<Dependency> {
        let mut current = Some(type_id);
        while let Some(id) = current {
            if let Some(fields) = self.fields.get(&id) {
                return fields.clone();
            }
            current = self.parent_of(id).map(|link| link.parent.id);
        }
        Vec::new()
    }

    fn is_ancestor(&self, candidate: TypeId, of: TypeId) -> bool {
        let mut current = Some(of);
        while let Some(type_id) = current {
            if type_id == candidate {
                return true;
            }
            current = self.parent_of(type_id).map(|link| link.parent.id);
        }
        false
    }
}

/// 在声明自身的依赖列表末尾追加依赖
///
/// 没有自身元数据的声明从空列表开始，不会复制祖先的列表。
pub fn attach(target: &Target, deps: Vec<Dependency>) -> DiResult<()> {
    STORE.write().write(target, deps, false)
}

/// 以继承方式追加依赖，读取时祖先的依赖排在前面
pub fn decorate(target: &Target, deps: Vec<Dependency>) -> DiResult<()> {
    STORE.write().write(target, deps, true)
}

/// 读取声明的依赖列表
///
/// 没有自身元数据时沿父链逐级查找，每次调用都重新计算。
pub fn read(target: &Target) -> Vec<Dependency> {
    STORE.read().read(target)
}

/// 声明自身是否有依赖元数据
pub fn has_own(target: &Target) -> bool {
    STORE.read().requires.contains_key(target)
}

/// 声明 `Child` 继承自 `Parent`
pub fn extends<Child: ?Sized + 'static, Parent: ?Sized + 'static>() -> DiResult<()> {
    link(TypeInfo::of::<Child>(), TypeInfo::of::<Parent>(), None)
}

/// 声明继承关系，并提供从子类型实例取得父类型实例的方式
///
/// 继承来的提供者方法会以转换后的父类型实例作为接收者。
pub fn extends_via<Child, Parent, F>(upcast: F) -> DiResult<()>
where
    Child: Any + Send + Sync,
    Parent: Any + Send + Sync,
    F: Fn(Arc<Child>) -> Arc<Parent> + Send + Sync + 'static,
{
    let upcast: Upcast = Arc::new(move |scope: Scope| {
        scope
            .downcast::<Child>()
            .ok()
            .map(|child| upcast(child) as Scope)
    });
    link(TypeInfo::of::<Child>(), TypeInfo::of::<Parent>(), Some(upcast))
}

fn link(child: TypeInfo, parent: TypeInfo, upcast: Option<Upcast>) -> DiResult<()> {
    let mut store = STORE.write();
    if store.is_ancestor(child.id, parent.id) {
        return Err(DiError::invalid_target(format!(
            "{} 不能继承自己的后代 {}",
            child, parent
        )));
    }
    store.types.entry(child.id).or_default().parent = Some(ParentLink { parent, upcast });
    Ok(())
}

/// 直接父类型
pub fn parent_of(type_id: TypeId) -> Option<TypeInfo> {
    STORE.read().parent_of(type_id).map(|link| link.parent.clone())
}

/// 从自身开始的祖先链
pub fn ancestry(type_info: &TypeInfo) -> Vec<Ancestor> {
    let store = STORE.read();
    let mut chain = vec![Ancestor {
        type_info: type_info.clone(),
        upcast: None,
    }];
    let mut current = type_info.id;
    while let Some(link) = store.parent_of(current) {
        chain.push(Ancestor {
            type_info: link.parent.clone(),
            upcast: link.upcast.clone(),
        });
        current = link.parent.id;
    }
    chain
}

/// 声明类型成员
///
/// 同名成员不能既是字段又是方法。
pub fn declare_member(owner: &TypeInfo, name: &str, kind: MemberKind) -> DiResult<()> {
    let mut store = STORE.write();
    let members = &mut store.types.entry(owner.id).or_default().members;
    match members.get(name) {
        Some(existing) if *existing != kind => Err(DiError::invalid_target(format!(
            "{}::{} 已声明为 {:?}",
            owner, name, existing
        ))),
        _ => {
            members.insert(name.to_string(), kind);
            Ok(())
        }
    }
}

/// 类型自身声明的成员种类
pub fn member_kind(owner: TypeId, name: &str) -> Option<MemberKind> {
    STORE.read().member_kind(owner, name)
}

/// 记录类型的构造函数
pub fn register_constructor(constructor: Constructor) {
    let type_id = constructor.type_info().id;
    STORE.write().types.entry(type_id).or_default().constructor = Some(constructor);
}

/// 已注册的构造函数
pub fn constructor_for(type_id: TypeId) -> Option<Constructor> {
    STORE
        .read()
        .types
        .get(&type_id)
        .and_then(|record| record.constructor.clone())
}

/// 记录提供者方法，重复注册时契约追加、工厂替换
pub fn attach_provides(target: &Target, provides: Vec<Dependency>, factory: Factory) -> DiResult<()> {
    let mut store = STORE.write();
    store.check_target(target)?;
    match store.provides.get_mut(target) {
        Some(existing) => {
            existing.provides.extend(provides);
            existing.factory = factory;
        }
        None => {
            store.provides.insert(
                target.clone(),
                ProvidedMethod {
                    target: target.clone(),
                    provides,
                    factory,
                },
            );
        }
    }
    Ok(())
}

/// 方法能提供的契约
pub fn read_provides(target: &Target) -> Vec<Dependency> {
    STORE
        .read()
        .provides
        .get(target)
        .map(|method| method.provides.clone())
        .unwrap_or_default()
}

/// 类型自身注册的提供者方法，按方法名排序
pub fn provided_methods(owner: TypeId) -> Vec<ProvidedMethod> {
    let store = STORE.read();
    let mut methods: Vec<ProvidedMethod> = store
        .provides
        .values()
        .filter(|method| matches!(&method.target, Target::Method { owner: o, .. } if o.id == owner))
        .cloned()
        .collect();
    methods.sort_by(|a, b| a.target.to_string().cmp(&b.target.to_string()));
    methods
}

/// 记录字段绑定，同一字段重复绑定时以最后一次为准
pub fn set_field(owner: &TypeInfo, dependency: Dependency) {
    let mut store = STORE.write();
    let fields = store.fields.entry(owner.id).or_default();
    match fields.iter_mut().find(|field| field.name == dependency.name) {
        Some(existing) => existing.contract = dependency.contract,
        None => fields.push(dependency),
    }
}

/// 类型的字段绑定，没有自身绑定时沿父链查找
pub fn read_fields(type_id: TypeId) -> Vec<Dependency> {
    STORE.read().read_fields(type_id)
}

/// 读取类型依赖时追加其字段绑定
///
/// 字段绑定与类型注册的先后顺序不影响结果。
pub fn require_fields(type_info: &TypeInfo) {
    STORE.write().with_fields.insert(type_info.id);
}
