//! 问答 DTO
//!
//! 定义问答相关的请求和响应数据结构。

use serde::{Deserialize, Serialize};

/// 问答查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskQuery {
    /// 问题文本
    pub question: Option<String>,
}

/// 问答响应
#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    /// 回答
    pub answer: String,
}
