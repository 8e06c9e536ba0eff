//! Process-local store used when no database is configured.
//!
//! Mirrors the PostgreSQL accessors: users are keyed by `user_id`, messages
//! are append-only. Contents are lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    message::{Message, NewMessage},
    user::{UpsertUser, User},
};
use crate::services::{message_service::MessageStore, user_service::UserStore};
use crate::utils::time;

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<i64, User>>,
    messages: RwLock<Vec<Message>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }
}

/// Keeps timestamps strictly increasing so "latest" is unambiguous.
fn next_timestamp(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = time::now();
    match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::microseconds(1),
        _ => now,
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn upsert_user(&self, user: UpsertUser) -> Result<User> {
        let mut users = self.users.write().await;
        let previous = users.get(&user.user_id).map(|u| u.last_interaction);
        let row = User {
            user_id: user.user_id,
            chat_id: user.chat_id,
            username: Some(user.username),
            first_name: Some(user.first_name),
            last_name: Some(user.last_name),
            last_interaction: next_timestamp(previous),
        };
        users.insert(row.user_id, row.clone());
        Ok(row)
    }

    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.last_interaction.cmp(&a.last_interaction));
        Ok(users)
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(self.users.read().await.len() as i64)
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn insert_message(&self, msg: NewMessage) -> Result<Message> {
        let mut messages = self.messages.write().await;
        let row = Message {
            id: Uuid::new_v4(),
            user_id: msg.user_id,
            chat_id: msg.chat_id,
            message_type: msg.message_type,
            content: msg.content,
            metadata: msg.metadata,
            sender_type: msg.sender_type,
            timestamp: next_timestamp(messages.last().map(|m| m.timestamp)),
        };
        messages.push(row.clone());
        Ok(row)
    }

    async fn list_messages(&self) -> Result<Vec<Message>> {
        let mut messages = self.messages.read().await.clone();
        messages.reverse();
        Ok(messages)
    }

    async fn latest_for_user(&self, user_id: i64) -> Result<Option<Message>> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .rev()
            .find(|m| m.user_id == user_id)
            .cloned())
    }
}
