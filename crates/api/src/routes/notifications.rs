//! Notification listing route.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{AppState, error::error_response, middleware::AuthUser};
use postboard_db::NotificationRepository;

/// Creates the notification routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/notifications", get(list_notifications))
}

/// GET `/notifications`
/// List the current user's notifications, newest first.
async fn list_notifications(State(state): State<AppState>, auth: AuthUser) -> Response {
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.list_for_user(auth.user_id()).await {
        Ok(notifications) => Json(notifications).into_response(),
        Err(e) => error_response(e),
    }
}
