use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    message::{LatestMessage, Message},
    user::User,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrRequest {
    pub text: Option<String>,
    #[serde(alias = "channelHandle")]
    pub channel_username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrResponse {
    pub success: bool,
    pub qr_code: String,
    pub text: String,
}

/// Operator clients send ids either as JSON numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdInput {
    Number(i64),
    Text(String),
}

impl UserIdInput {
    pub fn as_user_id(&self) -> Option<i64> {
        match self {
            UserIdInput::Number(id) => Some(*id),
            UserIdInput::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[validate(required)]
    pub user_id: Option<UserIdInput>,
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub success: bool,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWithLatestMessage {
    #[serde(flatten)]
    pub user: User,
    pub latest_message: Option<LatestMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserWithLatestMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub bot: Option<String>,
}
