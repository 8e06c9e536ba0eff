use std::sync::Arc;

use crate::dto::telegram_dto::ReplyMarkup;
use crate::error::Result;
use crate::services::telegram_service::BotTransport;

/// Outbound sends, plus the optional operator mirror.
#[derive(Clone)]
pub struct NotificationService {
    transport: Arc<dyn BotTransport>,
    admin_chat_id: Option<i64>,
}

impl NotificationService {
    pub fn new(transport: Arc<dyn BotTransport>, admin_chat_id: Option<i64>) -> Self {
        Self {
            transport,
            admin_chat_id,
        }
    }

    pub async fn send(&self, chat_id: i64, text: &str) -> Result<()> {
        self.transport.send_message(chat_id, text, None).await
    }

    pub async fn send_with_markup(&self, chat_id: i64, text: &str, markup: ReplyMarkup) -> Result<()> {
        self.transport.send_message(chat_id, text, Some(markup)).await
    }

    pub async fn acknowledge(&self, callback_query_id: &str) -> Result<()> {
        self.transport.answer_callback_query(callback_query_id).await
    }

    /// Returns `Ok(false)` without sending when no admin destination is configured.
    pub async fn notify_admin(&self, text: &str) -> Result<bool> {
        let Some(admin) = self.admin_chat_id else {
            return Ok(false);
        };
        self.send(admin, text).await?;
        Ok(true)
    }
}
