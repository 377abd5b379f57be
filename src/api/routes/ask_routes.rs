//! Ask Routes
//!
//! 定义问答相关的 API 路由。

use crate::api::handlers::ask_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建问答路由器
pub fn create_ask_router() -> Router<AppState> {
    Router::new().route("/ask", get(ask_question))
}
