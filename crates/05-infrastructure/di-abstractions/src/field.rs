//! 字段注入

use crate::contract::Contract;
use crate::dependency::Dependency;
use crate::metadata::{self, MemberKind};
use crate::options::{downcast, Options, Value};
use di_common::{DiError, DiResult, TypeInfo};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 可按字段名写入注入值的类型
pub trait FieldTarget {
    fn set_field(&mut self, key: &str, value: Value) -> DiResult<()>;
}

/// 将字段 `key` 绑定到契约，同一字段以最后一次绑定为准
pub fn field<T: ?Sized + 'static>(key: &str, contract: impl Into<Contract>) -> DiResult<()> {
    let owner = TypeInfo::of::<T>();
    if metadata::member_kind(owner.id, key) == Some(MemberKind::Method) {
        return Err(DiError::invalid_target(format!(
            "{}::{} 是方法，不能注入字段",
            owner, key
        )));
    }
    metadata::declare_member(&owner, key, MemberKind::Field)?;
    metadata::set_field(&owner, Dependency::named(key, contract));
    Ok(())
}

/// 类型的字段绑定，自身没有时沿父链查找
pub fn get_fields<T: ?Sized + 'static>() -> Vec<Dependency> {
    metadata::read_fields(TypeId::of::<T>())
}

/// 按字段绑定从注入选项中取值并写入目标
pub fn inject_fields<T: FieldTarget + 'static>(target: &mut T, values: &Options) -> DiResult<()> {
    for field in get_fields::<T>() {
        let value = values
            .get(field.contract.name())
            .ok_or_else(|| DiError::missing_value(format!("字段 {} 缺少契约 {}", field.name, field.contract)))?;
        target.set_field(&field.name.to_string(), value)?;
    }
    Ok(())
}

/// 取出字段值的具体类型
pub fn field_value<V: Any + Send + Sync>(key: &str, value: Value) -> DiResult<Arc<V>> {
    downcast(value, &key)
}

/// 可由注入值转换得到的字段类型，`#[derive(Fields)]` 生成的代码依赖它
pub trait FromFieldValue: Sized {
    fn from_field_value(key: &str, value: Value) -> DiResult<Self>;
}

impl<V: Any + Send + Sync> FromFieldValue for Arc<V> {
    fn from_field_value(key: &str, value: Value) -> DiResult<Self> {
        field_value(key, value)
    }
}

impl<V: Any + Send + Sync> FromFieldValue for Option<Arc<V>> {
    fn from_field_value(key: &str, value: Value) -> DiResult<Self> {
        field_value(key, value).map(Some)
    }
}
