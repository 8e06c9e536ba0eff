use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    dto::api_dto::{MessagesResponse, SendMessageRequest, SendMessageResponse},
    error::{Error, Result},
    models::message::NewMessage,
    AppState,
};

pub async fn list_messages(State(state): State<AppState>) -> Result<Json<MessagesResponse>> {
    let messages = state.message_store.list_messages().await.map_err(|e| {
        error!(error = ?e, "Error fetching messages");
        Error::Internal("Failed to fetch messages".into())
    })?;

    Ok(Json(MessagesResponse {
        success: true,
        messages,
    }))
}

/// Operator reply. The audit insert runs after the send; its failure is
/// logged and the response still reports success.
pub async fn send_message(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>> {
    let required = || Error::BadRequest("User ID and message are required".into());
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected send-message body");
        required()
    })?;
    payload.validate().map_err(|_| required())?;
    let user_id = payload
        .user_id
        .as_ref()
        .and_then(|u| u.as_user_id())
        .ok_or_else(required)?;
    let message = payload.message.ok_or_else(required)?;

    let user = state
        .user_store
        .get_by_user_id(user_id)
        .await
        .map_err(|e| {
            error!(user_id, error = ?e, "Error looking up user");
            Error::Internal("Failed to send message".into())
        })?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;

    state
        .notification_service
        .send(user.chat_id, &message)
        .await
        .map_err(|e| {
            error!(user_id, chat_id = user.chat_id, error = ?e, "Error sending message");
            Error::Internal("Failed to send message".into())
        })?;

    let record = NewMessage::from_admin(user.user_id, user.chat_id, message);
    match state.message_store.insert_message(record).await {
        Ok(_) => info!(user_id, "Admin message stored"),
        Err(e) => error!(user_id, error = ?e, "Error storing admin message"),
    }

    Ok(Json(SendMessageResponse {
        success: true,
        message: format!("Message sent to {}", user.display_name()),
    }))
}
