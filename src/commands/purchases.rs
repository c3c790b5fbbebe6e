use axum::extract::{Json, Path, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ListQuery;
use crate::db::{DbPool, DeliveryEvent, Purchase, PurchaseItem, Supplier};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;

const PURCHASE_FILTER: FilterSpec = FilterSpec::new(&["s.supplier_name", "p.status"])
    .with_category("p.supplier_id")
    .with_date("p.order_date");

const PURCHASE_STATUSES: [&str; 4] = ["ordered", "shipped", "delivered", "cancelled"];

pub async fn list_purchases(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<Purchase>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let purchases = list_purchases_internal(&state.pool, &query, today).await?;
    Ok(Json(purchases))
}

pub async fn list_purchases_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<Purchase>> {
    let mut sql = String::from(
        "SELECT p.*, s.supplier_name FROM purchases p
         JOIN suppliers s ON s.supplier_id = p.supplier_id",
    );
    let (clause, params) = PURCHASE_FILTER.build(
        query.search.as_deref(),
        query.category_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY p.order_date DESC, p.purchase_id DESC");

    let q = sqlx::query_as::<_, Purchase>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

#[derive(Debug, Serialize)]
pub struct PurchaseDetail {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub items: Vec<PurchaseItem>,
    pub tracking: Vec<DeliveryEvent>,
}

pub async fn get_purchase(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(purchase_id): Path<i32>,
) -> FarmResult<Json<PurchaseDetail>> {
    claims.require_supervisor()?;

    let purchase = sqlx::query_as::<_, Purchase>(
        "SELECT p.*, s.supplier_name FROM purchases p
         JOIN suppliers s ON s.supplier_id = p.supplier_id
         WHERE p.purchase_id = $1",
    )
    .bind(purchase_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| FarmError::NotFound("Purchase not found.".to_string()))?;

    let items = sqlx::query_as::<_, PurchaseItem>(
        "SELECT * FROM purchase_items WHERE purchase_id = $1 ORDER BY purchase_item_id",
    )
    .bind(purchase_id)
    .fetch_all(&state.pool)
    .await?;

    let tracking = sqlx::query_as::<_, DeliveryEvent>(
        "SELECT * FROM delivery_tracking WHERE purchase_id = $1 ORDER BY recorded_at ASC",
    )
    .bind(purchase_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(PurchaseDetail {
        purchase,
        items,
        tracking,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PurchaseLinePayload {
    pub item_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchasePayload {
    pub supplier_id: i32,
    pub order_date: NaiveDate,
    pub items: Vec<PurchaseLinePayload>,
}

pub async fn create_purchase(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePurchasePayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;
    let id = create_purchase_internal(&state.pool, payload, claims.user_id).await?;
    Ok(Json(id))
}

/// Header, line items and the initial tracking row commit as one unit; the
/// header total is derived from the lines.
pub async fn create_purchase_internal(
    pool: &DbPool,
    payload: CreatePurchasePayload,
    user_id: i32,
) -> FarmResult<i32> {
    if payload.items.is_empty() {
        return Err(FarmError::Validation(
            "A purchase needs at least one line item.".to_string(),
        ));
    }
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(FarmError::Validation(
                "Line quantities must be positive.".to_string(),
            ));
        }
        if line.description.trim().is_empty() {
            return Err(FarmError::Validation(
                "Line descriptions are required.".to_string(),
            ));
        }
    }
    let total: i64 = payload
        .items
        .iter()
        .map(|l| l.quantity as i64 * l.unit_price)
        .sum();

    let mut tx = pool.begin().await?;

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO purchases (supplier_id, order_date, total_amount, created_by)
         VALUES ($1, $2, $3, $4) RETURNING purchase_id",
    )
    .bind(payload.supplier_id)
    .bind(payload.order_date)
    .bind(total)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    for line in &payload.items {
        sqlx::query(
            "INSERT INTO purchase_items (purchase_id, item_id, description, quantity, unit_price)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(row.0)
        .bind(line.item_id)
        .bind(line.description.trim())
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO delivery_tracking (purchase_id, status, recorded_by)
         VALUES ($1, 'ordered', $2)",
    )
    .bind(row.0)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row.0)
}

#[derive(Debug, Deserialize)]
pub struct DeliveryStatusPayload {
    pub purchase_id: i32,
    pub status: String,
    pub notes: Option<String>,
}

pub async fn update_delivery_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeliveryStatusPayload>,
) -> FarmResult<Json<()>> {
    claims.require_supervisor()?;
    update_delivery_status_internal(
        &state.pool,
        payload.purchase_id,
        &payload.status,
        payload.notes,
        claims.user_id,
    )
    .await?;
    Ok(Json(()))
}

/// Header status change and the append-only history row commit together.
pub async fn update_delivery_status_internal(
    pool: &DbPool,
    purchase_id: i32,
    status: &str,
    notes: Option<String>,
    user_id: i32,
) -> FarmResult<()> {
    if !PURCHASE_STATUSES.contains(&status) {
        return Err(FarmError::Validation(format!(
            "Unknown delivery status: {}",
            status
        )));
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE purchases SET status = $1 WHERE purchase_id = $2")
        .bind(status)
        .bind(purchase_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::NotFound("Purchase not found.".to_string()));
    }

    sqlx::query(
        "INSERT INTO delivery_tracking (purchase_id, status, notes, recorded_by)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(purchase_id)
    .bind(status)
    .bind(&notes)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<Vec<Supplier>>> {
    claims.require_supervisor()?;
    let suppliers =
        sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY supplier_name")
            .fetch_all(&state.pool)
            .await?;
    Ok(Json(suppliers))
}
