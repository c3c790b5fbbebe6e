use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/waste", get(commands::waste::list_waste))
        .route("/api/waste/export", get(commands::waste::export_waste_csv))
        .route("/api/waste/record", post(commands::waste::record_waste))
        .route("/api/waste/delete", post(commands::waste::delete_waste))
}
