//! 日志接口
//!
//! 容器和模块只通过 [`Logger`] 输出诊断信息。默认实现 [`TracingLogger`]
//! 将日志转发到 `tracing`，[`NullLogger`] 丢弃所有输入。

use crate::configuration::LoggingConfig;
use crate::errors::{DiError, DiResult};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// 日志记录器 trait
///
/// 每个级别都有一个可以携带结构化数据的 `*_with` 变体。
pub trait Logger: Send + Sync {
    /// 记录一条日志
    fn log(&self, level: LogLevel, fields: Option<&Value>, message: &str);

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, None, message);
    }

    fn debug_with(&self, fields: Value, message: &str) {
        self.log(LogLevel::Debug, Some(&fields), message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, None, message);
    }

    fn info_with(&self, fields: Value, message: &str) {
        self.log(LogLevel::Info, Some(&fields), message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, None, message);
    }

    fn warn_with(&self, fields: Value, message: &str) {
        self.log(LogLevel::Warn, Some(&fields), message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, None, message);
    }

    fn error_with(&self, fields: Value, message: &str) {
        self.log(LogLevel::Error, Some(&fields), message);
    }
}

/// 按运行时级别分发日志调用
pub fn log_with_level(logger: &dyn Logger, level: LogLevel, fields: Value, message: &str) {
    match level {
        LogLevel::Debug => logger.debug_with(fields, message),
        LogLevel::Info => logger.info_with(fields, message),
        LogLevel::Warn => logger.warn_with(fields, message),
        LogLevel::Error => logger.error_with(fields, message),
    }
}

/// 不产生任何输出的日志记录器
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

static NULL_LOGGER: Lazy<Arc<NullLogger>> = Lazy::new(|| Arc::new(NullLogger));

impl NullLogger {
    /// 全局共享实例
    pub fn shared() -> Arc<dyn Logger> {
        NULL_LOGGER.clone()
    }
}

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _fields: Option<&Value>, _message: &str) {}
}

/// 基于 `tracing` 的日志记录器
#[derive(Debug, Clone)]
pub struct TracingLogger {
    name: String,
}

static TRACING_LOGGER: Lazy<Arc<TracingLogger>> = Lazy::new(|| Arc::new(TracingLogger::new("di")));

impl TracingLogger {
    /// 创建带名称的日志记录器，名称作为 `logger` 字段输出
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// 全局共享实例
    pub fn shared() -> Arc<dyn Logger> {
        TRACING_LOGGER.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

macro_rules! emit {
    ($macro:ident, $logger:expr, $fields:expr, $message:expr) => {
        match $fields {
            Some(fields) => tracing::$macro!(logger = %$logger, fields = %fields, "{}", $message),
            None => tracing::$macro!(logger = %$logger, "{}", $message),
        }
    };
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, fields: Option<&Value>, message: &str) {
        match level {
            LogLevel::Debug => emit!(debug, self.name, fields, message),
            LogLevel::Info => emit!(info, self.name, fields, message),
            LogLevel::Warn => emit!(warn, self.name, fields, message),
            LogLevel::Error => emit!(error, self.name, fields, message),
        }
    }
}

/// 初始化全局 `tracing` 订阅者
///
/// 已有订阅者时保持不变并返回 `Ok(false)`。
pub fn init_tracing(config: &LoggingConfig) -> DiResult<bool> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| DiError::InvalidConfig {
        message: format!("日志过滤器无效 '{}': {}", config.level, e),
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    Ok(installed)
}
