use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Contact,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    #[default]
    User,
    Admin,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Contact => "contact",
        }
    }
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::User => "user",
            SenderType::Admin => "admin",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageType::Text),
            "contact" => Ok(MessageType::Contact),
            other => Err(format!("unknown message_type `{}`", other)),
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(SenderType::User),
            "admin" => Ok(SenderType::Admin),
            other => Err(format!("unknown sender_type `{}`", other)),
        }
    }
}

/// Per-origin payload stored alongside a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageMetadata {
    Text {
        username: String,
        first_name: Option<String>,
        last_name: Option<String>,
        message_id: i64,
    },
    Contact {
        first_name: String,
        last_name: Option<String>,
        user_id: Option<i64>,
    },
    Admin {
        sent_by: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub user_id: i64,
    pub chat_id: i64,
    pub message_type: MessageType,
    pub content: String,
    pub metadata: MessageMetadata,
    pub sender_type: SenderType,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_type: MessageType,
    pub content: String,
    pub metadata: MessageMetadata,
    pub sender_type: SenderType,
}

impl NewMessage {
    pub fn contact(user_id: i64, chat_id: i64, phone_number: &str, metadata: MessageMetadata) -> Self {
        Self {
            user_id,
            chat_id,
            message_type: MessageType::Contact,
            content: format!("Phone: {}", phone_number),
            metadata,
            sender_type: SenderType::User,
        }
    }

    pub fn text(user_id: i64, chat_id: i64, content: String, metadata: MessageMetadata) -> Self {
        Self {
            user_id,
            chat_id,
            message_type: MessageType::Text,
            content,
            metadata,
            sender_type: SenderType::User,
        }
    }

    pub fn from_admin(user_id: i64, chat_id: i64, content: String) -> Self {
        Self {
            user_id,
            chat_id,
            message_type: MessageType::Text,
            content,
            metadata: MessageMetadata::Admin {
                sent_by: "dashboard".to_string(),
            },
            sender_type: SenderType::Admin,
        }
    }
}

/// Raw `messages` row; enum columns are plain TEXT.
#[derive(Debug, FromRow)]
pub struct MessageRow {
    pub id: Uuid,
    pub user_id: i64,
    pub chat_id: i64,
    pub message_type: String,
    pub content: String,
    pub metadata: Json<MessageMetadata>,
    pub sender_type: String,
    pub timestamp: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = crate::error::Error;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            chat_id: row.chat_id,
            message_type: row.message_type.parse().map_err(crate::error::Error::Internal)?,
            content: row.content,
            metadata: row.metadata.0,
            sender_type: row.sender_type.parse().map_err(crate::error::Error::Internal)?,
            timestamp: row.timestamp,
        })
    }
}

/// Summary attached to each user in the operator listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestMessage {
    pub message_text: String,
    pub created_at: DateTime<Utc>,
    pub sender_type: SenderType,
}

impl From<Message> for LatestMessage {
    fn from(msg: Message) -> Self {
        Self {
            message_text: msg.content,
            created_at: msg.timestamp,
            sender_type: msg.sender_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_is_tagged_by_origin() {
        let meta = MessageMetadata::Admin {
            sent_by: "dashboard".into(),
        };
        assert_eq!(
            serde_json::to_value(&meta).unwrap(),
            json!({ "kind": "admin", "sent_by": "dashboard" })
        );

        let parsed: MessageMetadata = serde_json::from_value(json!({
            "kind": "contact",
            "first_name": "Ana",
            "last_name": null,
            "user_id": 9
        }))
        .unwrap();
        assert_eq!(
            parsed,
            MessageMetadata::Contact {
                first_name: "Ana".into(),
                last_name: None,
                user_id: Some(9),
            }
        );
    }

    #[test]
    fn contact_content_is_labelled() {
        let msg = NewMessage::contact(
            1,
            1,
            "+15550100",
            MessageMetadata::Contact {
                first_name: "A".into(),
                last_name: None,
                user_id: Some(1),
            },
        );
        assert_eq!(msg.content, "Phone: +15550100");
        assert_eq!(msg.message_type, MessageType::Contact);
    }

    #[test]
    fn unknown_type_in_row_is_rejected() {
        let row = MessageRow {
            id: Uuid::new_v4(),
            user_id: 1,
            chat_id: 1,
            message_type: "photo".into(),
            content: String::new(),
            metadata: Json(MessageMetadata::Admin { sent_by: "x".into() }),
            sender_type: "user".into(),
            timestamp: Utc::now(),
        };
        assert!(Message::try_from(row).is_err());
    }
}
