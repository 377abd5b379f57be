use axum::{Json, extract::State, response::IntoResponse};
use tracing::debug;

use crate::api::{app_state::AppState, dto::member_dto::*};

pub async fn list_members(State(state): State<AppState>) -> impl IntoResponse {
    let members = state.ask_service.members().await;
    debug!("Listing {} members", members.len());

    Json(MembersResponse {
        total: members.len(),
        members,
    })
}
