use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/inventory/items", get(commands::inventory::list_items))
        .route(
            "/api/inventory/categories",
            get(commands::inventory::list_categories),
        )
        .route(
            "/api/inventory/low-stock",
            get(commands::inventory::list_low_stock),
        )
        .route(
            "/api/inventory/expiry",
            get(commands::inventory::expiry_tracking),
        )
        .route(
            "/api/inventory/expiry/export",
            get(commands::inventory::export_expiry_csv),
        )
}
