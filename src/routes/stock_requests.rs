use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/stock-requests",
            get(commands::stock_requests::list_requests),
        )
        .route(
            "/api/stock-requests/create",
            post(commands::stock_requests::create_request),
        )
        .route(
            "/api/stock-requests/approve",
            post(commands::stock_requests::approve_request),
        )
        .route(
            "/api/stock-requests/reject",
            post(commands::stock_requests::reject_request),
        )
        .route(
            "/api/stock-requests/fulfill",
            post(commands::stock_requests::fulfill_request),
        )
}
