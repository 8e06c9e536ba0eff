use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::dto::telegram_dto::{ReplyMarkup, TelegramResponse, TelegramUpdate, WebhookInfo};
use crate::error::{Error, Result};

/// Outbound half of the bot platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<()>;

    /// Clears the loading state of a pressed inline button.
    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct TelegramService {
    client: Client,
    api_url: String,
    token: String,
}

impl TelegramService {
    pub fn new(api_url: String, token: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &JsonValue) -> Result<T> {
        debug!(method, "Calling Telegram Bot API");
        let resp = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let envelope: TelegramResponse<T> = resp.json().await.map_err(|e| {
            Error::Telegram(format!("{} returned unreadable body ({}): {}", method, status, e))
        })?;

        if !envelope.ok {
            return Err(Error::Telegram(format!(
                "{} failed ({}): {}",
                method,
                status,
                envelope.description.unwrap_or_default()
            )));
        }

        envelope
            .result
            .ok_or_else(|| Error::Telegram(format!("{} returned no result", method)))
    }

    /// Long-polls for updates after `offset`. Blocks up to `timeout_secs` when idle.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<TelegramUpdate>> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }

        let resp = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&body)
            .send()
            .await?;

        let envelope: TelegramResponse<Vec<TelegramUpdate>> = resp.json().await?;
        if !envelope.ok {
            return Err(Error::Telegram(format!(
                "getUpdates failed: {}",
                envelope.description.unwrap_or_default()
            )));
        }
        Ok(envelope.result.unwrap_or_default())
    }

    pub async fn get_webhook_info(&self) -> Result<WebhookInfo> {
        self.call("getWebhookInfo", &json!({})).await
    }

    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        let mut body = json!({ "url": url });
        if let Some(secret) = secret_token {
            body["secret_token"] = json!(secret);
        }
        self.call::<bool>("setWebhook", &body).await.map(|_| ())
    }

    pub async fn delete_webhook(&self) -> Result<()> {
        self.call::<bool>("deleteWebhook", &json!({})).await.map(|_| ())
    }
}

#[async_trait]
impl BotTransport for TelegramService {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }

        self.call::<JsonValue>("sendMessage", &body).await.map(|_| ())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let body = json!({ "callback_query_id": callback_query_id });
        self.call::<bool>("answerCallbackQuery", &body).await.map(|_| ())
    }
}
