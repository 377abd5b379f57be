use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use tracing::{debug, warn};

use crate::{
    api::{app_state::AppState, dto::message_dto::*},
    services::source::fallback_page,
};

/// 代理上游消息列表并分页
///
/// 上游任何失败都返回固定的样例数据。
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessagesQuery>,
) -> impl IntoResponse {
    let (skip, limit) = (params.skip(), params.limit());
    debug!("Proxying messages: skip={}, limit={}", skip, limit);

    match state.fetcher.fetch_page().await {
        Ok(page) => Json(page.paginate(skip, limit)),
        Err(e) => {
            warn!(error = %e, "Messages proxy falling back to sample payload");
            Json(fallback_page())
        }
    }
}

/// 调试信息：上游状态、成员概况和缓存计数
pub async fn debug_info(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.fetcher.fetch_outcome().await;
    let directory = &outcome.directory;

    Json(DebugResponse {
        source: state.fetcher.source_description(),
        upstream_ok: outcome.upstream_ok(),
        member_count: directory.len(),
        message_count: directory.total_messages(),
        member_names: directory.names().into_iter().take(10).collect(),
        cache: state.fetcher.cache_stats(),
    })
}

/// 所有对外接口
pub fn available_endpoints() -> Vec<String> {
    [
        "/health",
        "/members",
        "/ask?question=<text>",
        "/messages/?skip=<n>&limit=<n>",
        "/debug",
        "/metrics",
        "/version",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// 未知路径
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!("No route for {}", uri);
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Endpoint not found".to_string(),
            available_endpoints: available_endpoints(),
        }),
    )
}
