//! 工厂配置
//!
//! 从 TOML 读取，环境变量优先：
//!
//! ```toml
//! display_name = "orderFactory"
//! allow_bean_definition_overriding = false
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::logging::LoggingConfig;

/// 覆盖 `allow_bean_definition_overriding` 的环境变量
pub const ENV_ALLOW_BEAN_OVERRIDING: &str = "CHIMERA_ALLOW_BEAN_OVERRIDING";

/// 覆盖 `display_name` 的环境变量
pub const ENV_FACTORY_NAME: &str = "CHIMERA_FACTORY_NAME";

fn default_true() -> bool {
    true
}

/// Bean 工厂配置
#[derive(Debug, Clone, Deserialize)]
pub struct FactoryConfig {
    /// 工厂名称（用于日志和错误信息）
    #[serde(default)]
    pub display_name: Option<String>,

    /// 是否允许同名定义覆盖（默认：true）
    #[serde(default = "default_true")]
    pub allow_bean_definition_overriding: bool,

    /// 是否使用通过 `inventory` 提交的类初始化类注册表（默认：true）
    #[serde(default = "default_true")]
    pub register_submitted_classes: bool,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            display_name: None,
            allow_bean_definition_overriding: true,
            register_submitted_classes: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl FactoryConfig {
    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse factory configuration")
    }

    /// 从文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        tracing::debug!("Loaded factory configuration from {:?}", path);
        Ok(config)
    }

    /// 默认配置叠加环境变量
    pub fn from_env() -> anyhow::Result<Self> {
        Self::default().apply_env()
    }

    /// 用环境变量覆盖当前配置
    ///
    /// 日志相关变量（RUST_LOG / LOG_LEVEL / LOG_FORMAT）同时生效
    pub fn apply_env(mut self) -> anyhow::Result<Self> {
        if let Ok(value) = std::env::var(ENV_ALLOW_BEAN_OVERRIDING) {
            self.allow_bean_definition_overriding = parse_bool(&value).with_context(|| {
                format!("Invalid value for {}: '{}'", ENV_ALLOW_BEAN_OVERRIDING, value)
            })?;
        }

        if let Ok(name) = std::env::var(ENV_FACTORY_NAME) {
            if !name.is_empty() {
                self.display_name = Some(name);
            }
        }

        self.logging = self.logging.apply_env();
        Ok(self)
    }

    /// 日志配置
    pub fn logging_config(&self) -> &LoggingConfig {
        &self.logging
    }
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => anyhow::bail!("expected a boolean"),
    }
}
