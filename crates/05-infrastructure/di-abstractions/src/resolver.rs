//! 解析器抽象接口
//!
//! 容器对外暴露的最小能力，供被构造对象和工厂递归请求依赖。

use crate::contract::Contract;
use crate::options::{downcast, ExtraArgs, Options, Value};
use async_trait::async_trait;
use di_common::DiResult;
use std::any::Any;
use std::sync::{Arc, Weak};

/// 解析器 trait
#[async_trait]
pub trait Resolver: Send + Sync {
    /// 解析契约，`contract` 为 `None` 时返回 `MissingValue`
    async fn create_with(
        &self,
        contract: Option<Contract>,
        options: Options,
        args: ExtraArgs,
    ) -> DiResult<Value>;

    /// 是否已经完成配置
    fn is_ready(&self) -> bool;

    /// 用于还原具体的容器类型
    fn as_any(&self) -> &dyn Any;
}

/// 共享的解析器引用
pub type SharedResolver = Arc<dyn Resolver>;

/// 模块持有的弱引用，避免容器与模块互相持有
pub type WeakResolver = Weak<dyn Resolver>;

impl dyn Resolver {
    /// 不带显式选项解析契约
    pub async fn create(&self, contract: impl Into<Contract>) -> DiResult<Value> {
        self.create_with(Some(contract.into()), Options::new(), Vec::new())
            .await
    }

    /// 解析并向下转型
    pub async fn create_as<T: Any + Send + Sync>(
        &self,
        contract: impl Into<Contract>,
    ) -> DiResult<Arc<T>> {
        let contract = contract.into();
        let value = self
            .create_with(Some(contract.clone()), Options::new(), Vec::new())
            .await?;
        downcast(value, &contract)
    }
}

/// 两个引用是否指向同一个解析器
pub fn same_resolver(first: &SharedResolver, second: &SharedResolver) -> bool {
    std::ptr::eq(
        Arc::as_ptr(first) as *const (),
        Arc::as_ptr(second) as *const (),
    )
}
