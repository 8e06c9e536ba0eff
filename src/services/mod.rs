pub mod bot_service;
pub mod memory_store;
pub mod message_service;
pub mod notification_service;
pub mod polling_service;
pub mod qr_service;
pub mod telegram_service;
pub mod user_service;
