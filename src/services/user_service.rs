use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::user::{UpsertUser, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user or, on a `user_id` conflict, overwrites the chat id,
    /// display fields and `last_interaction`.
    async fn upsert_user(&self, user: UpsertUser) -> Result<User>;

    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<User>>;

    /// Most recently active first.
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn count_users(&self) -> Result<i64>;
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserService {
    async fn upsert_user(&self, user: UpsertUser) -> Result<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, chat_id, username, first_name, last_name, last_interaction)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET chat_id = EXCLUDED.chat_id,
                username = EXCLUDED.username,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                last_interaction = EXCLUDED.last_interaction
            RETURNING user_id, chat_id, username, first_name, last_name, last_interaction
            "#,
        )
        .bind(user.user_id)
        .bind(user.chat_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_by_user_id(&self, user_id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, chat_id, username, first_name, last_name, last_interaction
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, chat_id, username, first_name, last_name, last_interaction
            FROM users
            ORDER BY last_interaction DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_users(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
