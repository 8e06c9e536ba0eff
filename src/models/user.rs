use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::dto::telegram_dto::TelegramUser;

pub const UNKNOWN_USERNAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub last_interaction: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpsertUser {
    pub user_id: i64,
    pub chat_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl UpsertUser {
    /// Missing display fields become sentinels: `"Unknown"` for the handle, empty for names.
    pub fn from_sender(sender: &TelegramUser, chat_id: i64) -> Self {
        Self {
            user_id: sender.id,
            chat_id,
            username: sender
                .username
                .clone()
                .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
            first_name: sender.first_name.clone().unwrap_or_default(),
            last_name: sender.last_name.clone().unwrap_or_default(),
        }
    }
}
