use axum::extract::{Json, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ListQuery;
use crate::db::{DbPool, UsageRecord};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;

const USAGE_FILTER: FilterSpec = FilterSpec::new(&["i.item_name", "i.sku", "u.purpose"])
    .with_category("i.category_id")
    .with_date("u.used_at");

pub async fn list_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<UsageRecord>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let records = list_usage_internal(&state.pool, &query, today).await?;
    Ok(Json(records))
}

pub async fn list_usage_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<UsageRecord>> {
    let mut sql = String::from(
        "SELECT u.*, i.item_name FROM inventory_usage u
         JOIN inventory_items i ON i.item_id = u.item_id",
    );
    let (clause, params) = USAGE_FILTER.build(
        query.search.as_deref(),
        query.category_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY u.used_at DESC, u.usage_id DESC");

    let q = sqlx::query_as::<_, UsageRecord>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

#[derive(Debug, Deserialize)]
pub struct RecordUsagePayload {
    pub item_id: i32,
    pub quantity: i32,
    pub purpose: Option<String>,
    pub used_at: Option<NaiveDate>,
}

pub async fn record_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RecordUsagePayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;
    let used_at = payload
        .used_at
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let id = record_usage_internal(
        &state.pool,
        payload.item_id,
        payload.quantity,
        payload.purpose,
        claims.user_id,
        used_at,
    )
    .await?;
    Ok(Json(id))
}

/// Inserts the immutable usage row and decrements the item's materialized
/// quantity in one transaction; the row lock serializes concurrent writers.
pub async fn record_usage_internal(
    pool: &DbPool,
    item_id: i32,
    quantity: i32,
    purpose: Option<String>,
    user_id: i32,
    used_at: NaiveDate,
) -> FarmResult<i32> {
    if quantity <= 0 {
        return Err(FarmError::Validation(
            "Usage quantity must be positive.".to_string(),
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
            "Cannot record usage greater than available stock".to_string(),
        ));
    }

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO inventory_usage (item_id, quantity, purpose, used_by, used_at)
         VALUES ($1, $2, $3, $4, $5) RETURNING usage_id",
    )
    .bind(item_id)
    .bind(quantity)
    .bind(&purpose)
    .bind(user_id)
    .bind(used_at)
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
pub struct DeleteUsagePayload {
    pub usage_id: i32,
}

pub async fn delete_usage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteUsagePayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    delete_usage_internal(&state.pool, payload.usage_id).await?;
    Ok(Json(()))
}

/// Exact reversal of `record_usage_internal`: delete the ledger row and
/// re-increment the quantity, atomically.
pub async fn delete_usage_internal(pool: &DbPool, usage_id: i32) -> FarmResult<()> {
    let mut tx = pool.begin().await?;

    let row: Option<(i32, i32)> = sqlx::query_as(
        "SELECT item_id, quantity FROM inventory_usage WHERE usage_id = $1 FOR UPDATE",
    )
    .bind(usage_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (item_id, quantity) = match row {
        Some(r) => r,
        None => return Err(FarmError::NotFound("Usage record not found.".to_string())),
    };

    sqlx::query("DELETE FROM inventory_usage WHERE usage_id = $1")
        .bind(usage_id)
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
