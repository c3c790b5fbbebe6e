use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/usage", get(commands::usage::list_usage))
        .route("/api/usage/record", post(commands::usage::record_usage))
        .route("/api/usage/delete", post(commands::usage::delete_usage))
}
