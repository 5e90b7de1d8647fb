//! 错误类型定义

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 错误类别
///
/// 与 [`DiError`] 的变体一一对应，便于调用方只按类别匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyBound,
    NotBound,
    MissingValue,
    InvalidProvider,
    InvalidTarget,
    DescriptorNotFound,
    LoggerNotFound,
    CyclicDependency,
    ResolutionTooDeep,
    ConstructionFailed,
    InvalidConfig,
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DiError {
    #[error("容器已经配置: {message}")]
    AlreadyBound { message: String },

    #[error("容器尚未配置: {message}")]
    NotBound { message: String },

    #[error("缺少必需的值: {message}")]
    MissingValue {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("提供者类型无效: {message}")]
    InvalidProvider { message: String },

    #[error("注解目标无效: {message}")]
    InvalidTarget { message: String },

    #[error("未找到成员描述符: {member}")]
    DescriptorNotFound { member: String },

    #[error("未配置日志记录器: {message}")]
    LoggerNotFound { message: String },

    #[error("检测到循环依赖: {chain}")]
    CyclicDependency { chain: String },

    #[error("依赖解析深度超过上限 {limit}: {chain}")]
    ResolutionTooDeep { limit: usize, chain: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ConstructionFailed {
        type_name: String,
        #[source]
        source: BoxError,
    },

    #[error("容器配置无效: {message}")]
    InvalidConfig { message: String },
}

impl DiError {
    /// 创建重复配置错误
    pub fn already_bound(message: impl Into<String>) -> Self {
        Self::AlreadyBound {
            message: message.into(),
        }
    }

    /// 创建未配置错误
    pub fn not_bound(message: impl Into<String>) -> Self {
        Self::NotBound {
            message: message.into(),
        }
    }

    /// 创建缺失值错误
    pub fn missing_value(message: impl Into<String>) -> Self {
        Self::MissingValue {
            message: message.into(),
            source: None,
        }
    }

    /// 创建无效提供者错误
    pub fn invalid_provider(message: impl Into<String>) -> Self {
        Self::InvalidProvider {
            message: message.into(),
        }
    }

    /// 创建无效目标错误
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget {
            message: message.into(),
        }
    }

    /// 创建描述符缺失错误
    pub fn descriptor_not_found(member: impl Into<String>) -> Self {
        Self::DescriptorNotFound {
            member: member.into(),
        }
    }

    /// 创建日志记录器缺失错误
    pub fn logger_not_found(message: impl Into<String>) -> Self {
        Self::LoggerNotFound {
            message: message.into(),
        }
    }

    /// 包装用户构造函数或工厂返回的错误
    pub fn construction_failed(
        type_name: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ConstructionFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 为缺失值错误附加原因
    ///
    /// 其他类别的错误原样返回，原因链只用于诊断。
    pub fn caused_by(self, cause: impl Into<BoxError>) -> Self {
        match self {
            Self::MissingValue { message, .. } => Self::MissingValue {
                message,
                source: Some(cause.into()),
            },
            other => other,
        }
    }

    /// 错误类别
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyBound { .. } => ErrorKind::AlreadyBound,
            Self::NotBound { .. } => ErrorKind::NotBound,
            Self::MissingValue { .. } => ErrorKind::MissingValue,
            Self::InvalidProvider { .. } => ErrorKind::InvalidProvider,
            Self::InvalidTarget { .. } => ErrorKind::InvalidTarget,
            Self::DescriptorNotFound { .. } => ErrorKind::DescriptorNotFound,
            Self::LoggerNotFound { .. } => ErrorKind::LoggerNotFound,
            Self::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            Self::ResolutionTooDeep { .. } => ErrorKind::ResolutionTooDeep,
            Self::ConstructionFailed { .. } => ErrorKind::ConstructionFailed,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// 原因链长度
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            depth += 1;
            current = cause.source();
        }
        depth
    }
}

/// 结果类型别名
pub type DiResult<T> = Result<T, DiError>;
