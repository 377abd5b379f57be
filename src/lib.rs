//! Member QA - 成员问答服务
//!
//! 从远程 messages API 拉取成员消息，按作者分组，并用关键词规则回答
//! 关于某个成员的自然语言问题。

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod qa;
pub mod services;
