use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/reports/dashboard",
            get(commands::reports::dashboard_stats),
        )
        .route("/api/reports/crops", get(commands::reports::crop_report))
        .route(
            "/api/reports/inventory",
            get(commands::reports::inventory_report),
        )
        .route(
            "/api/reports/monthly",
            get(commands::reports::monthly_report),
        )
}
