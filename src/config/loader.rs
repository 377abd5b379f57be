use crate::config::config::AppConfig;
use crate::error::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::PathBuf;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "MEMBER_QA_";

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索顺序：
    /// 1. 内置默认值
    /// 2. `MEMBER_QA_CONFIG` 指定的文件，否则 ./member-qa.toml
    /// 3. 环境变量（`MEMBER_QA_SERVER__PORT=9000`）
    pub fn load() -> Result<AppConfig> {
        let path = std::env::var("MEMBER_QA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        Self::load_from(path)
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__").global());

        Ok(figment.extract()?)
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> std::result::Result<(), ConfigValidationError> {
        if config.server.port == 0 {
            return Err(ConfigValidationError::InvalidPort);
        }

        if config.source.base_url.trim().is_empty() {
            return Err(ConfigValidationError::MissingBaseUrl);
        }

        if config.source.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        if config.extractor.max_snippet_chars == 0 {
            return Err(ConfigValidationError::InvalidSnippetBudget);
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("服务端口无效，必须大于 0")]
    InvalidPort,

    #[error("上游 API 地址未配置")]
    MissingBaseUrl,

    #[error("上游请求超时无效，必须大于 0")]
    InvalidTimeout,

    #[error("摘要长度无效，必须大于 0")]
    InvalidSnippetBudget,
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("member-qa.toml")
}
