use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ping", get(commands::utility::ping))
        .route("/api/auth/login", post(commands::config::login))
        .route("/api/auth/users", get(commands::config::get_all_users))
        .route(
            "/api/auth/users/create",
            post(commands::config::create_user),
        )
        .route(
            "/api/auth/users/update",
            post(commands::config::update_user),
        )
        .route(
            "/api/auth/users/delete",
            post(commands::config::delete_user),
        )
}
