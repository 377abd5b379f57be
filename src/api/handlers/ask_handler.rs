use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::debug;

use crate::api::{app_state::AppState, dto::ask_dto::*};

/// 回答关于成员的问题
///
/// 始终返回 200：缺少问题、识别不到成员、上游不可用都以文字回答的形式给出。
pub async fn ask_question(
    State(state): State<AppState>,
    Query(params): Query<AskQuery>,
) -> impl IntoResponse {
    let question = params.question.unwrap_or_default();
    debug!("Question received: {:?}", question);

    let outcome = state.ask_service.answer(&question).await;

    Json(AskResponse {
        answer: outcome.answer,
    })
}
