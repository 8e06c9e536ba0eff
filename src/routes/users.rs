use axum::{extract::State, Json};
use futures_util::future::join_all;
use tracing::{error, warn};

use crate::{
    dto::api_dto::{UserWithLatestMessage, UsersResponse},
    error::{Error, Result},
    AppState,
};

/// Users by recent activity, each with its newest message. One lookup per
/// user, run concurrently; `join_all` preserves the listing order.
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UsersResponse>> {
    let users = state.user_store.list_users().await.map_err(|e| {
        error!(error = ?e, "Error fetching users");
        Error::Internal("Failed to fetch users".into())
    })?;

    let store = &state.message_store;
    let users = join_all(users.into_iter().map(|user| async move {
        let latest_message = match store.latest_for_user(user.user_id).await {
            Ok(latest) => latest.map(Into::into),
            Err(e) => {
                warn!(user_id = user.user_id, error = ?e, "Error fetching latest message");
                None
            }
        };
        UserWithLatestMessage {
            user,
            latest_message,
        }
    }))
    .await;

    Ok(Json(UsersResponse {
        success: true,
        users,
    }))
}
