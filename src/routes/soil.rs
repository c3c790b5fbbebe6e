use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/soil/readings", get(commands::soil::list_readings))
        .route(
            "/api/soil/readings/create",
            post(commands::soil::add_reading),
        )
        .route(
            "/api/soil/readings/delete",
            post(commands::soil::delete_reading),
        )
        .route("/api/soil/treatments", get(commands::soil::list_treatments))
        .route(
            "/api/soil/treatments/create",
            post(commands::soil::add_treatment),
        )
        .route(
            "/api/soil/treatments/delete",
            post(commands::soil::delete_treatment),
        )
}
