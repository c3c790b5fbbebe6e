use axum::extract::{Json, State};
use axum::Extension;
use serde::Deserialize;
use sqlx::{Postgres, Transaction};

use crate::db::Notification;
use crate::error::{FarmError, FarmResult};
use crate::middleware::auth::Claims;
use crate::state::AppState;

/// Called inside quantity-mutating transactions; emits at most one unread
/// low-stock notification per item.
pub async fn notify_if_low_stock(
    tx: &mut Transaction<'_, Postgres>,
    item_id: i32,
) -> FarmResult<()> {
    let item: Option<(String, i32, i32)> = sqlx::query_as(
        "SELECT item_name, quantity, reorder_level FROM inventory_items WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_optional(&mut **tx)
    .await?;

    let (item_name, quantity, reorder_level) = match item {
        Some(row) => row,
        None => return Ok(()),
    };
    if quantity > reorder_level {
        return Ok(());
    }

    let unread: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM notifications
         WHERE item_id = $1 AND kind = 'low_stock' AND is_read = FALSE",
    )
    .bind(item_id)
    .fetch_one(&mut **tx)
    .await?;
    if unread.0 > 0 {
        return Ok(());
    }

    sqlx::query(
        "INSERT INTO notifications (kind, message, item_id)
         VALUES ('low_stock', $1, $2)",
    )
    .bind(format!(
        "{} is low on stock ({} remaining, reorder at {}).",
        item_name, quantity, reorder_level
    ))
    .bind(item_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn list_unread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<Vec<Notification>>> {
    claims.require_supervisor()?;
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE is_read = FALSE ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(notifications))
}

#[derive(Debug, Deserialize)]
pub struct MarkReadPayload {
    pub notification_id: i32,
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MarkReadPayload>,
) -> FarmResult<Json<()>> {
    claims.require_supervisor()?;
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE notification_id = $1")
        .bind(payload.notification_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::NotFound("Notification not found.".to_string()));
    }
    Ok(Json(()))
}
