use crate::state::AppState;
use axum::Router;

pub mod auth;
pub mod crops;
pub mod environment;
pub mod inventory;
pub mod notifications;
pub mod purchases;
pub mod reports;
pub mod soil;
pub mod staff;
pub mod stock_requests;
pub mod usage;
pub mod waste;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(crops::router())
        .merge(inventory::router())
        .merge(usage::router())
        .merge(waste::router())
        .merge(stock_requests::router())
        .merge(purchases::router())
        .merge(soil::router())
        .merge(environment::router())
        .merge(staff::router())
        .merge(reports::router())
        .merge(notifications::router())
}
