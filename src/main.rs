use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use enquiry_relay::{
    config::{Config, TelegramMode},
    database::pool::{create_pool, run_migrations},
    routes,
    services::{
        memory_store::InMemoryStore,
        message_service::{MessageService, MessageStore},
        polling_service::PollingService,
        telegram_service::TelegramService,
        user_service::{UserService, UserStore},
    },
    AppState,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.is_production());

    let (user_store, message_store): (Arc<dyn UserStore>, Arc<dyn MessageStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                run_migrations(&pool).await?;
                let users = UserService::new(pool.clone());
                match users.count_users().await {
                    Ok(count) => info!(users = count, "Database connection successful"),
                    Err(e) => warn!(error = ?e, "Database reachable but users table not readable"),
                }
                let messages: Arc<dyn MessageStore> = Arc::new(MessageService::new(pool));
                let users: Arc<dyn UserStore> = Arc::new(users);
                (users, messages)
            }
            None => {
                warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
                let store = Arc::new(InMemoryStore::new());
                let users: Arc<dyn UserStore> = store.clone();
                let messages: Arc<dyn MessageStore> = store;
                (users, messages)
            }
        };

    let telegram = TelegramService::new(
        config.telegram_api_url.clone(),
        config.telegram_bot_token.clone(),
    )?;
    let app_state = AppState::new(
        config.clone(),
        user_store,
        message_store,
        Arc::new(telegram.clone()),
    );

    match config.telegram_mode {
        TelegramMode::Webhook => {
            let base = config.webapp_url.as_deref().unwrap_or_default();
            let target_webhook_url = format!("{}/api/webhook/telegram", base);
            info!("Checking Telegram webhook status...");
            match telegram.get_webhook_info().await {
                Ok(current) if current.url == target_webhook_url => {
                    info!("Telegram webhook is already up to date: {}", current.url);
                }
                Ok(current) => {
                    info!("Updating Telegram webhook: {} -> {}", current.url, target_webhook_url);
                    match telegram
                        .set_webhook(&target_webhook_url, config.telegram_webhook_secret.as_deref())
                        .await
                    {
                        Ok(()) => info!("Telegram webhook registered successfully"),
                        Err(e) => warn!(error = ?e, "Failed to register Telegram webhook"),
                    }
                }
                Err(e) => warn!(error = ?e, "Could not check Telegram webhook status"),
            }
        }
        TelegramMode::Polling => {
            if let Err(e) = telegram.delete_webhook().await {
                warn!(error = ?e, "Could not clear Telegram webhook before polling");
            }
            let mut poller = PollingService::new(
                telegram.clone(),
                app_state.bot_service.clone(),
                config.poll_timeout_secs,
            );
            tokio::spawn(async move {
                info!("Bot started with long polling");
                loop {
                    match poller.run_once().await {
                        Ok(true) => {}
                        Ok(false) => {
                            tokio::time::sleep(Duration::from_millis(250)).await;
                        }
                        Err(e) => {
                            tracing::error!(error = ?e, "Polling worker error");
                            tokio::time::sleep(Duration::from_secs(2)).await;
                        }
                    }
                }
            });
        }
    }

    let app = routes::router(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    if let Some(bot) = &config.bot_username {
        info!("Telegram Bot: @{}", bot);
    }
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down gracefully...");
}
