//! 核心数据模型模块
//!
//! 定义上游消息、成员记录和成员目录。

pub mod directory;
pub mod message;

pub use directory::*;
pub use message::*;
