use axum::extract::{Json, Query, State};
use axum::Extension;
use serde::Deserialize;

use crate::db::{DbPool, StockRequest};
use crate::error::{FarmError, FarmResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

pub const STATUS_ORDER: [&str; 4] = ["pending", "approved", "fulfilled", "rejected"];
pub const PRIORITY_ORDER: [&str; 4] = ["urgent", "high", "medium", "low"];

/// Listing rank of a request status; unknown statuses sort last.
pub fn status_rank(status: &str) -> usize {
    STATUS_ORDER
        .iter()
        .position(|s| *s == status)
        .unwrap_or(STATUS_ORDER.len())
}

pub fn priority_rank(priority: &str) -> usize {
    PRIORITY_ORDER
        .iter()
        .position(|p| *p == priority)
        .unwrap_or(PRIORITY_ORDER.len())
}

/// ORDER BY generated through the rank functions so the SQL ordering and
/// the in-process ranking cannot disagree.
pub(crate) fn listing_order_clause() -> String {
    let status_case: String = STATUS_ORDER
        .iter()
        .map(|s| format!(" WHEN '{}' THEN {}", s, status_rank(s)))
        .collect();
    let priority_case: String = PRIORITY_ORDER
        .iter()
        .map(|p| format!(" WHEN '{}' THEN {}", p, priority_rank(p)))
        .collect();
    format!(
        "ORDER BY CASE r.status{} ELSE {} END, CASE r.priority{} ELSE {} END, r.requested_at DESC",
        status_case,
        STATUS_ORDER.len(),
        priority_case,
        PRIORITY_ORDER.len()
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestListQuery {
    pub status: Option<String>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RequestListQuery>,
) -> FarmResult<Json<Vec<StockRequest>>> {
    claims.require_supervisor()?;
    let requests = list_requests_internal(&state.pool, query.status.as_deref()).await?;
    Ok(Json(requests))
}

pub async fn list_requests_internal(
    pool: &DbPool,
    status: Option<&str>,
) -> FarmResult<Vec<StockRequest>> {
    let mut sql = String::from(
        "SELECT r.*, i.item_name FROM stock_requests r
         JOIN inventory_items i ON i.item_id = r.item_id",
    );
    if status.is_some() {
        sql.push_str(" WHERE r.status = $1");
    }
    sql.push(' ');
    sql.push_str(&listing_order_clause());

    let query = sqlx::query_as::<_, StockRequest>(&sql);
    let query = match status {
        Some(s) => query.bind(s.to_string()),
        None => query,
    };
    Ok(query.fetch_all(pool).await?)
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestPayload {
    pub item_id: i32,
    pub quantity: i32,
    pub priority: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRequestPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;

    if payload.quantity <= 0 {
        return Err(FarmError::Validation(
            "Requested quantity must be positive.".to_string(),
        ));
    }
    let priority = payload.priority.unwrap_or_else(|| "medium".to_string());
    if priority_rank(&priority) >= PRIORITY_ORDER.len() {
        return Err(FarmError::Validation(format!(
            "Unknown priority: {}",
            priority
        )));
    }

    let item_exists: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM inventory_items WHERE item_id = $1")
            .bind(payload.item_id)
            .fetch_one(&state.pool)
            .await?;
    if item_exists.0 == 0 {
        return Err(FarmError::NotFound("Inventory item not found.".to_string()));
    }

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO stock_requests (item_id, quantity, priority, notes, requested_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING request_id",
    )
    .bind(payload.item_id)
    .bind(payload.quantity)
    .bind(&priority)
    .bind(&payload.notes)
    .bind(claims.user_id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(row.0))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
    pub request_id: i32,
    pub notes: Option<String>,
}

/// pending -> approved. Approval never touches inventory; quantities only
/// move at fulfillment.
pub async fn approve_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewPayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    approve_request_internal(&state.pool, payload.request_id, claims.user_id, payload.notes)
        .await?;
    Ok(Json(()))
}

pub async fn approve_request_internal(
    pool: &DbPool,
    request_id: i32,
    reviewer_id: i32,
    notes: Option<String>,
) -> FarmResult<()> {
    let result = sqlx::query(
        "UPDATE stock_requests
         SET status = 'approved', reviewed_by = $1, reviewed_at = now(), review_notes = $2
         WHERE request_id = $3 AND status = 'pending'",
    )
    .bind(reviewer_id)
    .bind(notes)
    .bind(request_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(FarmError::Validation(
            "Request not found or already processed.".to_string(),
        ));
    }
    Ok(())
}

/// pending|approved -> rejected.
pub async fn reject_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReviewPayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    reject_request_internal(&state.pool, payload.request_id, claims.user_id, payload.notes)
        .await?;
    Ok(Json(()))
}

pub async fn reject_request_internal(
    pool: &DbPool,
    request_id: i32,
    reviewer_id: i32,
    notes: Option<String>,
) -> FarmResult<()> {
    let result = sqlx::query(
        "UPDATE stock_requests
         SET status = 'rejected', reviewed_by = $1, reviewed_at = now(), review_notes = $2
         WHERE request_id = $3 AND status IN ('pending', 'approved')",
    )
    .bind(reviewer_id)
    .bind(notes)
    .bind(request_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(FarmError::Validation(
            "Request not found or already processed.".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct FulfillPayload {
    pub request_id: i32,
}

pub async fn fulfill_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<FulfillPayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    fulfill_request_internal(&state.pool, payload.request_id).await?;
    Ok(Json(()))
}

/// approved -> fulfilled. Inventory increment and status change commit
/// together or not at all; the row locks serialize concurrent fulfillments
/// of the same item.
pub async fn fulfill_request_internal(pool: &DbPool, request_id: i32) -> FarmResult<()> {
    let mut tx = pool.begin().await?;

    let request: Option<(String, i32, i32)> = sqlx::query_as(
        "SELECT status, item_id, quantity FROM stock_requests
         WHERE request_id = $1 FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let (status, item_id, quantity) = match request {
        Some(row) => row,
        None => return Err(FarmError::NotFound("Request not found.".to_string())),
    };
    if status != "approved" {
        return Err(FarmError::Validation(format!(
            "Only approved requests can be fulfilled (current status: {}).",
            status
        )));
    }

    let locked: Option<(i32,)> =
        sqlx::query_as("SELECT quantity FROM inventory_items WHERE item_id = $1 FOR UPDATE")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
    if locked.is_none() {
        return Err(FarmError::NotFound("Inventory item not found.".to_string()));
    }

    sqlx::query(
        "UPDATE inventory_items SET quantity = quantity + $1, updated_at = now()
         WHERE item_id = $2",
    )
    .bind(quantity)
    .bind(item_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE stock_requests SET status = 'fulfilled', fulfilled_at = now()
         WHERE request_id = $1",
    )
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
