use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use crate::error::Result;
use crate::models::message::{Message, MessageRow, NewMessage};

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Appends a message. There is no update path.
    async fn insert_message(&self, msg: NewMessage) -> Result<Message>;

    /// Newest first.
    async fn list_messages(&self) -> Result<Vec<Message>>;

    async fn latest_for_user(&self, user_id: i64) -> Result<Option<Message>>;
}

#[derive(Clone)]
pub struct MessageService {
    pool: PgPool,
}

impl MessageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageService {
    async fn insert_message(&self, msg: NewMessage) -> Result<Message> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (user_id, chat_id, message_type, content, metadata, sender_type, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, user_id, chat_id, message_type, content, metadata, sender_type, timestamp
            "#,
        )
        .bind(msg.user_id)
        .bind(msg.chat_id)
        .bind(msg.message_type.as_str())
        .bind(&msg.content)
        .bind(Json(&msg.metadata))
        .bind(msg.sender_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Message::try_from(row)
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, user_id, chat_id, message_type, content, metadata, sender_type, timestamp
            FROM messages
            ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn latest_for_user(&self, user_id: i64) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, user_id, chat_id, message_type, content, metadata, sender_type, timestamp
            FROM messages
            WHERE user_id = $1
            ORDER BY timestamp DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Message::try_from).transpose()
    }
}
