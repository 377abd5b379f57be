//! Member Routes

use crate::api::handlers::member_handler::*;
use axum::{Router, routing::get};

use crate::api::app_state::AppState;

/// 创建成员路由器
pub fn create_member_router() -> Router<AppState> {
    Router::new().route("/members", get(list_members))
}
