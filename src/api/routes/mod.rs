//! Routes 模块
//!
//! 定义 API 路由。

pub mod ask_routes;
pub mod member_routes;
pub mod message_routes;
