use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/environment/readings",
            get(commands::environment::list_readings),
        )
        .route(
            "/api/environment/readings/record",
            post(commands::environment::record_reading),
        )
}
