//! API 模块
//!
//! 提供 REST API 支持。

pub mod app_state;
pub mod dto;
pub mod handlers;
pub mod routes;

use crate::api::app_state::AppState;
use crate::observability::{ObservabilityState, create_observability_router, metrics_middleware};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 业务路由
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .merge(routes::ask_routes::create_ask_router())
        .merge(routes::member_routes::create_member_router())
        .merge(routes::message_routes::create_message_router())
        .with_state(app_state)
}

/// 完整应用：业务路由、可观测性路由、404 兜底、请求日志和请求指标
pub fn create_app(app_state: AppState, observability_state: Arc<ObservabilityState>) -> Router {
    let metrics = app_state.metrics.clone();

    create_observability_router(observability_state)
        .merge(create_router(app_state))
        .fallback(handlers::message_handler::not_found)
        .layer(axum::middleware::from_fn_with_state(
            metrics,
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}
