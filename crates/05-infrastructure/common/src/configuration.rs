//! 容器与日志配置

use crate::errors::{DiError, DiResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 是否启用循环依赖检测
    pub detect_cycles: bool,
    /// 最大解析深度
    ///
    /// 无环的依赖图超过该深度同样以 `ResolutionTooDeep` 失败，层级很深的图需要调大。
    pub max_resolution_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            max_resolution_depth: 512,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` 语法的过滤器
    pub level: String,
    /// 是否输出 JSON 格式
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingConfig {
    /// 开发环境配置
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json: false,
        }
    }
}

/// 配置文件根节点
///
/// ```toml
/// [container]
/// detect_cycles = true
/// max_resolution_depth = 32
///
/// [logging]
/// level = "di=debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiSettings {
    /// 容器配置
    pub container: ContainerConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

impl DiSettings {
    /// 从 TOML 字符串加载
    pub fn from_toml_str(source: &str) -> DiResult<Self> {
        let settings: Self = toml::from_str(source).map_err(|e| DiError::InvalidConfig {
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// 从 TOML 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> DiResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| DiError::InvalidConfig {
            message: format!("配置文件读取失败 {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> DiResult<()> {
        if self.container.max_resolution_depth == 0 {
            return Err(DiError::InvalidConfig {
                message: "max_resolution_depth 必须大于 0".to_string(),
            });
        }
        Ok(())
    }
}
