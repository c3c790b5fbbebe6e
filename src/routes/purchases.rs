use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/purchases", get(commands::purchases::list_purchases))
        .route(
            "/api/purchases/:purchase_id",
            get(commands::purchases::get_purchase),
        )
        .route(
            "/api/purchases/create",
            post(commands::purchases::create_purchase),
        )
        .route(
            "/api/purchases/delivery-status",
            post(commands::purchases::update_delivery_status),
        )
        .route("/api/suppliers", get(commands::purchases::list_suppliers))
}
