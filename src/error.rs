//! 错误处理模块
//!
//! 定义应用程序的错误类型。上游相关的错误在获取层被吸收，不会变成 HTTP 错误。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 上游服务错误
    #[error("上游服务错误: {0}")]
    Upstream(String),

    /// 超时错误
    #[error("操作超时: {0}")]
    Timeout(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),
}

impl AppError {
    /// 是否属于上游不可用（包括超时）
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::Upstream(_) | AppError::Timeout(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AppError::Timeout(e.to_string())
        } else if e.is_decode() {
            AppError::Serialization(e.to_string())
        } else {
            AppError::Upstream(e.to_string())
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_upstream() {
        assert!(AppError::Upstream("down".into()).is_upstream());
        assert!(AppError::Timeout("slow".into()).is_upstream());
        assert!(!AppError::Serialization("bad".into()).is_upstream());
        assert!(!AppError::Config("bad".into()).is_upstream());
    }

    #[test]
    fn test_json_error_is_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
