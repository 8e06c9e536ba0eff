pub mod health;
pub mod messages;
pub mod qr;
pub mod telegram;
pub mod users;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let static_dir = Path::new(&state.config.static_dir).to_path_buf();

    let api = Router::new()
        .route("/api/generate-qr", post(qr::generate_qr))
        .route("/api/messages", get(messages::list_messages))
        .route("/api/users", get(users::list_users))
        .route("/api/send-message", post(messages::send_message))
        .route("/api/webhook/telegram", post(telegram::handle_webhook));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route_service("/admin", ServeFile::new(static_dir.join("admin.html")))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
