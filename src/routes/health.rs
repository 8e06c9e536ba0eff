use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{dto::api_dto::HealthResponse, utils::time, AppState};

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "OK",
        timestamp: time::now(),
        bot: state.config.bot_username.clone(),
    };
    (StatusCode::OK, Json(body))
}
