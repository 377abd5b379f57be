//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod ask_handler;
pub mod member_handler;
pub mod message_handler;

pub use ask_handler::*;
pub use member_handler::*;
pub use message_handler::*;
