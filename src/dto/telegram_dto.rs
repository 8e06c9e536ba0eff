use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    pub text: Option<String>,
    pub contact: Option<TelegramContact>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(default)]
    pub r#type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramContact {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    pub message: Option<TelegramMessage>,
    pub data: Option<String>,
}

/// Envelope of every Bot API reply.
#[derive(Debug, Deserialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookInfo {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline(InlineKeyboardMarkup),
    Keyboard(ReplyKeyboardMarkup),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub one_time_keyboard: bool,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_contact: bool,
}

impl InlineKeyboardButton {
    pub fn new(text: &str, callback_data: &str) -> Self {
        Self {
            text: text.to_string(),
            callback_data: callback_data.to_string(),
        }
    }
}

/// A classified inbound event, one variant per router entry point.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    StartCommand {
        sender: TelegramUser,
        chat_id: i64,
    },
    ButtonPress {
        callback_id: String,
        chat_id: Option<i64>,
        action: Option<String>,
    },
    ContactShared {
        sender: TelegramUser,
        chat_id: i64,
        contact: TelegramContact,
    },
    TextMessage {
        sender: TelegramUser,
        chat_id: i64,
        message_id: i64,
        body: String,
    },
}

impl InboundEvent {
    /// Returns `None` for updates the bot does not react to: unknown commands,
    /// messages without a sender and unsupported update kinds.
    pub fn from_update(update: TelegramUpdate) -> Option<Self> {
        if let Some(query) = update.callback_query {
            return Some(InboundEvent::ButtonPress {
                callback_id: query.id,
                chat_id: query.message.map(|m| m.chat.id),
                action: query.data,
            });
        }

        let message = update.message?;
        let sender = message.from?;
        let chat_id = message.chat.id;

        if let Some(text) = message.text.as_deref() {
            if text.starts_with("/start") {
                return Some(InboundEvent::StartCommand { sender, chat_id });
            }
            if text.starts_with('/') {
                return None;
            }
        }

        if let Some(contact) = message.contact {
            return Some(InboundEvent::ContactShared {
                sender,
                chat_id,
                contact,
            });
        }

        Some(InboundEvent::TextMessage {
            sender,
            chat_id,
            message_id: message.message_id,
            body: message.text.unwrap_or_default(),
        })
    }
}
