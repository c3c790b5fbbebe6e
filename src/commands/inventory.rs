use axum::extract::{Json, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use chrono::NaiveDate;
use serde::Serialize;

use super::ListQuery;
use crate::db::{DbPool, InventoryBatch, InventoryCategory, InventoryItem};
use crate::error::{FarmError, FarmResult};
use crate::logic::expiry::{classify_expiry, days_remaining, ExpirySummary, ExpiryStatus};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;

const ITEM_FILTER: FilterSpec = FilterSpec::new(&["i.item_name", "i.sku", "s.supplier_name"])
    .with_category("i.category_id")
    .with_date("i.expiry_date");

const BATCH_FILTER: FilterSpec = FilterSpec::new(&["i.item_name", "i.sku", "b.batch_code"])
    .with_category("i.category_id")
    .with_date("b.expiry_date");

pub async fn list_items(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<InventoryItem>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let items = list_items_internal(&state.pool, &query, today).await?;
    Ok(Json(items))
}

pub async fn list_items_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<InventoryItem>> {
    let mut sql = String::from(
        "SELECT i.*, c.category_name, s.supplier_name FROM inventory_items i
         LEFT JOIN inventory_categories c ON c.category_id = i.category_id
         LEFT JOIN suppliers s ON s.supplier_id = i.supplier_id",
    );
    let (clause, params) = ITEM_FILTER.build(
        query.search.as_deref(),
        query.category_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY i.item_name");

    let q = sqlx::query_as::<_, InventoryItem>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<Vec<InventoryCategory>>> {
    claims.require_supervisor()?;
    let categories = sqlx::query_as::<_, InventoryCategory>(
        "SELECT * FROM inventory_categories ORDER BY category_name",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(categories))
}

pub async fn list_low_stock(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<Vec<InventoryItem>>> {
    claims.require_supervisor()?;
    let items = sqlx::query_as::<_, InventoryItem>(
        "SELECT i.*, c.category_name, s.supplier_name FROM inventory_items i
         LEFT JOIN inventory_categories c ON c.category_id = i.category_id
         LEFT JOIN suppliers s ON s.supplier_id = i.supplier_id
         WHERE i.quantity <= i.reorder_level
         ORDER BY i.quantity ASC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(items))
}

/// One expiry-tracking row: the batch plus its classification. The same
/// classification backs row highlighting, the summary counts and the CSV.
#[derive(Debug, Serialize)]
pub struct ExpiryRow {
    #[serde(flatten)]
    pub batch: InventoryBatch,
    pub days_remaining: Option<i64>,
    pub expiry_status: Option<ExpiryStatus>,
}

#[derive(Debug, Serialize)]
pub struct ExpiryReport {
    pub rows: Vec<ExpiryRow>,
    pub summary: ExpirySummary,
}

pub async fn expiry_tracking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<ExpiryReport>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let report = expiry_tracking_internal(&state.pool, &query, today).await?;
    Ok(Json(report))
}

pub async fn expiry_tracking_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<ExpiryReport> {
    let batches = list_batches_internal(pool, query, today).await?;

    let summary = crate::logic::expiry::summarize(
        batches.iter().filter_map(|b| b.expiry_date.as_ref()),
        today,
    );

    let rows = batches
        .into_iter()
        .map(|batch| {
            let days = batch.expiry_date.map(|d| days_remaining(d, today));
            let status = batch.expiry_date.map(|d| classify_expiry(d, today));
            ExpiryRow {
                batch,
                days_remaining: days,
                expiry_status: status,
            }
        })
        .collect();

    Ok(ExpiryReport { rows, summary })
}

pub async fn list_batches_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<InventoryBatch>> {
    let mut sql = String::from(
        "SELECT b.*, i.item_name FROM inventory_batches b
         JOIN inventory_items i ON i.item_id = b.item_id",
    );
    let (clause, params) = BATCH_FILTER.build(
        query.search.as_deref(),
        query.category_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY b.expiry_date ASC NULLS LAST, b.batch_id");

    let q = sqlx::query_as::<_, InventoryBatch>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

/// Same filtered rows as `expiry_tracking`, rendered as CSV.
pub async fn export_expiry_csv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Response> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let report = expiry_tracking_internal(&state.pool, &query, today).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "batch_id",
        "item",
        "batch_code",
        "quantity",
        "expiry_date",
        "days_remaining",
        "status",
    ])?;
    for row in &report.rows {
        writer.write_record([
            row.batch.batch_id.to_string(),
            row.batch.item_name.clone().unwrap_or_default(),
            row.batch.batch_code.clone(),
            row.batch.quantity.to_string(),
            row.batch
                .expiry_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.days_remaining
                .map(|d| d.to_string())
                .unwrap_or_default(),
            row.expiry_status
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
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
                "attachment; filename=\"expiry_tracking.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}
