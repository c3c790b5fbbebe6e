use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/notifications",
            get(commands::notifications::list_unread),
        )
        .route(
            "/api/notifications/mark-read",
            post(commands::notifications::mark_read),
        )
}
