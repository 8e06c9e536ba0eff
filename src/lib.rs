pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    bot_service::BotService, message_service::MessageStore,
    notification_service::NotificationService, qr_service::QrService,
    telegram_service::BotTransport, user_service::UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_store: Arc<dyn UserStore>,
    pub message_store: Arc<dyn MessageStore>,
    pub notification_service: NotificationService,
    pub bot_service: BotService,
    pub qr_service: QrService,
}

impl AppState {
    pub fn new(
        config: Config,
        user_store: Arc<dyn UserStore>,
        message_store: Arc<dyn MessageStore>,
        transport: Arc<dyn BotTransport>,
    ) -> Self {
        let notification_service = NotificationService::new(transport, config.admin_telegram_id);
        let bot_service = BotService::new(
            user_store.clone(),
            message_store.clone(),
            notification_service.clone(),
        );
        let qr_service = QrService::new(config.default_channel_username.clone());

        Self {
            config: Arc::new(config),
            user_store,
            message_store,
            notification_service,
            bot_service,
            qr_service,
        }
    }
}
