use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_CHANNEL_USERNAME: &str = "enquiry_chat_bot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramMode {
    Polling,
    Webhook,
}

impl FromStr for TelegramMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "polling" => Ok(TelegramMode::Polling),
            "webhook" => Ok(TelegramMode::Webhook),
            other => Err(format!("expected `polling` or `webhook`, got `{}`", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub telegram_bot_token: String,
    pub telegram_api_url: String,
    pub telegram_mode: TelegramMode,
    pub telegram_webhook_secret: Option<String>,
    pub webapp_url: Option<String>,
    pub admin_telegram_id: Option<i64>,
    pub bot_username: Option<String>,
    pub default_channel_username: String,
    pub static_dir: String,
    pub app_env: String,
    pub poll_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server_address = match get("SERVER_ADDRESS") {
            Some(addr) => addr,
            None => format!("0.0.0.0:{}", get("PORT").unwrap_or_else(|| "3000".to_string())),
        };

        let telegram_mode = parse_or(get("TELEGRAM_MODE"), "TELEGRAM_MODE", TelegramMode::Polling)?;
        let webapp_url = get("WEBAPP_URL").map(|u| u.trim_end_matches('/').to_string());
        if telegram_mode == TelegramMode::Webhook && webapp_url.is_none() {
            return Err(Error::Config(
                "WEBAPP_URL is required when TELEGRAM_MODE=webhook".to_string(),
            ));
        }

        Ok(Self {
            server_address,
            database_url: get("DATABASE_URL"),
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
                Error::Config("Missing environment variable: TELEGRAM_BOT_TOKEN".to_string())
            })?,
            telegram_api_url: get("TELEGRAM_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            telegram_mode,
            telegram_webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
            webapp_url,
            admin_telegram_id: get("ADMIN_TELEGRAM_ID")
                .map(|raw| parse_value::<i64>(&raw, "ADMIN_TELEGRAM_ID"))
                .transpose()?,
            bot_username: get("BOT_USERNAME"),
            default_channel_username: get("DEFAULT_CHANNEL_USERNAME")
                .unwrap_or_else(|| DEFAULT_CHANNEL_USERNAME.to_string()),
            static_dir: get("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            app_env: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
            poll_timeout_secs: parse_or(get("POLL_TIMEOUT_SECS"), "POLL_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

fn parse_value<T>(raw: &str, name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn parse_or<T>(raw: Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => parse_value(&raw, name),
        None => Ok(default),
    }
}
