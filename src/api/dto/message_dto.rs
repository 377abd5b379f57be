//! 消息 DTO
//!
//! 定义消息代理和调试接口的数据结构。

use serde::{Deserialize, Serialize};

use crate::services::cache::CacheStats;

/// 默认分页大小
pub const DEFAULT_LIMIT: usize = 100;

/// 消息分页参数
///
/// 参数无法解析为非负整数时回落到默认值，而不是返回 400。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessagesQuery {
    /// 跳过条数
    pub skip: Option<String>,
    /// 返回条数
    pub limit: Option<String>,
}

impl MessagesQuery {
    pub fn skip(&self) -> usize {
        parse_or(self.skip.as_deref(), 0)
    }

    pub fn limit(&self) -> usize {
        parse_or(self.limit.as_deref(), DEFAULT_LIMIT)
    }
}

fn parse_or(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// 调试信息响应
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    /// 数据源
    pub source: String,
    /// 上游是否可用
    pub upstream_ok: bool,
    /// 成员数量
    pub member_count: usize,
    /// 消息总数
    pub message_count: usize,
    /// 前 10 个成员名
    pub member_names: Vec<String>,
    /// 缓存状态
    pub cache: Option<CacheStats>,
}

/// 未知路径响应
#[derive(Debug, Serialize, Deserialize)]
pub struct NotFoundResponse {
    /// 错误信息
    pub error: String,
    /// 可用接口
    pub available_endpoints: Vec<String>,
}
