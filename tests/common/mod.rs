#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use enquiry_relay::{
    config::Config,
    dto::telegram_dto::ReplyMarkup,
    error::{Error, Result},
    services::{memory_store::InMemoryStore, telegram_service::BotTransport},
    AppState,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_markup: Option<ReplyMarkup>,
}

/// Records every outbound call. Sends to `fail_chat_id` fail.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<SentMessage>>,
    pub acknowledged: Mutex<Vec<String>>,
    pub fail_chat_id: Option<i64>,
}

impl RecordingTransport {
    pub fn failing_for(chat_id: i64) -> Self {
        Self {
            fail_chat_id: Some(chat_id),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl BotTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<ReplyMarkup>,
    ) -> Result<()> {
        if self.fail_chat_id == Some(chat_id) {
            return Err(Error::Telegram("Bad Request: chat not found".into()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            reply_markup,
        });
        Ok(())
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        self.acknowledged
            .lock()
            .unwrap()
            .push(callback_query_id.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub transport: Arc<RecordingTransport>,
}

pub fn test_config(vars: &[(&str, &str)]) -> Config {
    let mut all = vec![("TELEGRAM_BOT_TOKEN", "123:test"), ("BOT_USERNAME", "relay_bot")];
    all.extend_from_slice(vars);
    Config::from_source(|name| {
        all.iter()
            .rev()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
    })
    .expect("test config")
}

pub fn setup_app_with(config: Config, transport: RecordingTransport) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let transport = Arc::new(transport);
    let state = AppState::new(config, store.clone(), store.clone(), transport.clone());
    TestApp {
        router: enquiry_relay::routes::router(state),
        store,
        transport,
    }
}

pub fn setup_app() -> TestApp {
    setup_app_with(test_config(&[]), RecordingTransport::default())
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    match body {
        Some(body) => send_raw(app, method, uri, Some("application/json"), &body.to_string()).await,
        None => send_raw(app, method, uri, None, "").await,
    }
}

/// Sends `body` verbatim, with a Content-Type header only when one is given.
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, json)
}
