//! Message Routes
//!
//! 定义消息代理和调试路由。

use crate::api::handlers::message_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建消息路由器
pub fn create_message_router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/", get(list_messages))
        .route("/debug", get(debug_info))
}
