use axum::extract::{Json, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ListQuery;
use crate::db::{DbPool, WasteRecord};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;

const WASTE_FILTER: FilterSpec = FilterSpec::new(&["i.item_name", "i.sku", "w.reason"])
    .with_category("i.category_id")
    .with_date("w.wasted_at");

pub async fn list_waste(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<WasteRecord>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let records = list_waste_internal(&state.pool, &query, today).await?;
    Ok(Json(records))
}

pub async fn list_waste_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<WasteRecord>> {
    let mut sql = String::from(
        "SELECT w.*, i.item_name, i.unit FROM waste_management w
         JOIN inventory_items i ON i.item_id = w.item_id",
    );
    let (clause, params) = WASTE_FILTER.build(
        query.search.as_deref(),
        query.category_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY w.wasted_at DESC, w.waste_id DESC");

    let q = sqlx::query_as::<_, WasteRecord>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

/// CSV export runs the exact same filtered query as the listing, so the two
/// can never diverge.
pub async fn export_waste_csv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Response> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let records = list_waste_internal(&state.pool, &query, today).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["waste_id", "item", "quantity", "unit", "reason", "wasted_at"])?;
    for record in &records {
        writer.write_record([
            record.waste_id.to_string(),
            record.item_name.clone().unwrap_or_default(),
            record.quantity.to_string(),
            record.unit.clone().unwrap_or_default(),
            record.reason.clone(),
            record.wasted_at.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| FarmError::Internal(format!("CSV flush failed: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"waste_records.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct RecordWastePayload {
    pub item_id: i32,
    pub quantity: i32,
    pub reason: String,
    pub wasted_at: Option<NaiveDate>,
}

pub async fn record_waste(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RecordWastePayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;
    let wasted_at = payload
        .wasted_at
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let id = record_waste_internal(
        &state.pool,
        payload.item_id,
        payload.quantity,
        &payload.reason,
        claims.user_id,
        wasted_at,
    )
    .await?;
    Ok(Json(id))
}

/// Ledger insert + quantity decrement in one transaction. An over-stock
/// request is rejected before anything is written.
pub async fn record_waste_internal(
    pool: &DbPool,
    item_id: i32,
    quantity: i32,
    reason: &str,
    user_id: i32,
    wasted_at: NaiveDate,
) -> FarmResult<i32> {
    if quantity <= 0 {
        return Err(FarmError::Validation(
            "Waste quantity must be positive.".to_string(),
        ));
    }
    if reason.trim().is_empty() {
        return Err(FarmError::Validation(
            "A waste reason is required.".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let current: Option<(i32,)> =
        sqlx::query_as("SELECT quantity FROM inventory_items WHERE item_id = $1 FOR UPDATE")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
    let current = match current {
        Some((q,)) => q,
        None => return Err(FarmError::NotFound("Inventory item not found.".to_string())),
    };
    if quantity > current {
        return Err(FarmError::Validation(
            "Cannot record waste greater than available stock".to_string(),
        ));
    }

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO waste_management (item_id, quantity, reason, recorded_by, wasted_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING waste_id",
    )
    .bind(item_id)
    .bind(quantity)
    .bind(reason.trim())
    .bind(user_id)
    .bind(wasted_at)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE inventory_items SET quantity = quantity - $1, updated_at = now()
         WHERE item_id = $2",
    )
    .bind(quantity)
    .bind(item_id)
    .execute(&mut *tx)
    .await?;

    super::notifications::notify_if_low_stock(&mut tx, item_id).await?;

    tx.commit().await?;
    Ok(row.0)
}

#[derive(Debug, Deserialize)]
pub struct DeleteWastePayload {
    pub waste_id: i32,
}

pub async fn delete_waste(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteWastePayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    delete_waste_internal(&state.pool, payload.waste_id).await?;
    Ok(Json(()))
}

pub async fn delete_waste_internal(pool: &DbPool, waste_id: i32) -> FarmResult<()> {
    let mut tx = pool.begin().await?;

    let row: Option<(i32, i32)> = sqlx::query_as(
        "SELECT item_id, quantity FROM waste_management WHERE waste_id = $1 FOR UPDATE",
    )
    .bind(waste_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (item_id, quantity) = match row {
        Some(r) => r,
        None => return Err(FarmError::NotFound("Waste record not found.".to_string())),
    };

    sqlx::query("DELETE FROM waste_management WHERE waste_id = $1")
        .bind(waste_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE inventory_items SET quantity = quantity + $1, updated_at = now()
         WHERE item_id = $2",
    )
    .bind(quantity)
    .bind(item_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
