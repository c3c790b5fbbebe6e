use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/staff", get(commands::staff::list_staff))
        .route(
            "/api/staff/:staff_id/assignments",
            get(commands::staff::list_assignments),
        )
        .route("/api/staff/assign", post(commands::staff::assign_field))
        .route(
            "/api/staff/:staff_id/documents",
            get(commands::staff::list_documents),
        )
        .route(
            "/api/staff/documents/upload",
            post(commands::staff::upload_document),
        )
        .route(
            "/api/staff/documents/delete",
            post(commands::staff::delete_document),
        )
}
