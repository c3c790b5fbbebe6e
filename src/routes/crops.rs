use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/crops", get(commands::crops::list_crops))
        .route("/api/crops/create", post(commands::crops::create_crop))
        .route("/api/crops/stage", post(commands::crops::set_stage))
        .route("/api/crops/timeline", get(commands::crops::growth_timeline))
        .route(
            "/api/crops/:crop_id/milestones",
            get(commands::crops::list_milestones),
        )
        .route(
            "/api/crops/:crop_id/activities",
            get(commands::crops::list_activities),
        )
        .route(
            "/api/crops/activities/create",
            post(commands::crops::add_activity),
        )
        .route(
            "/api/crops/:crop_id/issues",
            get(commands::crops::list_issues),
        )
        .route(
            "/api/crops/issues/create",
            post(commands::crops::report_issue),
        )
        .route(
            "/api/crops/issues/resolve",
            post(commands::crops::resolve_issue),
        )
}
