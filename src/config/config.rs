use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 服务地址
    pub host: String,
    /// 服务端口
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

/// 消息来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// 远程 messages API
    #[default]
    Remote,
    /// 内置样例数据，不访问上游
    Mock,
}

/// 上游消息源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 上游 API 基础地址
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 来源类型
    pub mode: SourceMode,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://november7-730026606190.europe-west1.run.app".into(),
            timeout_secs: 10,
            mode: SourceMode::Remote,
        }
    }
}

/// 成员目录缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 是否启用缓存
    pub enabled: bool,
    /// 缓存有效期（秒），0 表示永不过期
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
        }
    }
}

/// 成员目录配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DirectoryConfig {
    /// 是否按时间戳倒序排列每个成员的消息
    pub sort_by_timestamp: bool,
}

/// 姓名解析配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// 已知成员全名，用于生成别名表
    pub known_members: Vec<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            known_members: [
                "Sophia Al-Farsi",
                "Fatima El-Tahir",
                "Armand Dupont",
                "Hans Müller",
                "Layla Kawaguchi",
                "Amina Van Den Berg",
                "Vikram Desai",
                "Lily O'Sullivan",
                "Lorenzo Cavalli",
                "Thiago Monteiro",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// 话题抽取配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// 兜底回答中消息摘要的最大字符数
    pub max_snippet_chars: usize,
    /// 找不到成员时列出的候选数量
    pub max_suggestions: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_snippet_chars: 150,
            max_suggestions: 5,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 结构化日志格式
    pub structured: bool,
    /// 日志文件目录
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            structured: false,
            log_dir: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 上游消息源配置
    pub source: SourceConfig,
    /// 缓存配置
    pub cache: CacheConfig,
    /// 成员目录配置
    pub directory: DirectoryConfig,
    /// 姓名解析配置
    pub resolver: ResolverConfig,
    /// 话题抽取配置
    pub extractor: ExtractorConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            server: ServerConfig::default(),
            source: SourceConfig::default(),
            cache: CacheConfig::default(),
            directory: DirectoryConfig::default(),
            resolver: ResolverConfig::default(),
            extractor: ExtractorConfig::default(),
            logging: LoggingConfig {
                level: "debug".into(),
                ..LoggingConfig::default()
            },
            app_name: "member-qa".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.structured = true;
        config
    }

    /// 离线运行配置：使用内置样例数据
    pub fn offline() -> Self {
        let mut config = Self::development();
        config.source.mode = SourceMode::Mock;
        config
    }
}
