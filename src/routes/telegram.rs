use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use subtle::ConstantTimeEq;

use crate::{
    dto::telegram_dto::TelegramUpdate,
    error::{Error, Result},
    AppState,
};

pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<TelegramUpdate>,
) -> Result<StatusCode> {
    verify_secret(&headers, state.config.telegram_webhook_secret.as_deref())?;
    tracing::info!("Received Telegram webhook update ID: {}", update.update_id);

    state.bot_service.handle_update(update).await;

    Ok(StatusCode::OK)
}

fn verify_secret(headers: &HeaderMap, expected: Option<&str>) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let Some(secret_hdr) = headers.get(SECRET_TOKEN_HEADER) else {
        return Err(Error::Unauthorized("missing_webhook_secret".into()));
    };
    let provided = secret_hdr
        .to_str()
        .map_err(|_| Error::Unauthorized("invalid_secret_header".into()))?;
    if ConstantTimeEq::ct_eq(provided.as_bytes(), expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(Error::Unauthorized("invalid_webhook_secret".into()))
    }
}
