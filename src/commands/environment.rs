use axum::extract::{Json, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ListQuery;
use crate::db::{DbPool, EnvironmentalReading};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;

const READING_FILTER: FilterSpec = FilterSpec::new(&["f.field_name"])
    .with_category("r.field_id")
    .with_date("r.reading_time::date");

pub async fn list_readings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<EnvironmentalReading>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let readings = list_readings_internal(&state.pool, &query, today).await?;
    Ok(Json(readings))
}

pub async fn list_readings_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<EnvironmentalReading>> {
    let mut sql = String::from(
        "SELECT r.*, f.field_name FROM environmental_readings r
         JOIN fields f ON f.field_id = r.field_id",
    );
    let (clause, params) = READING_FILTER.build(
        query.search.as_deref(),
        query.field_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY r.reading_time DESC, r.reading_id DESC");

    let q = sqlx::query_as::<_, EnvironmentalReading>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

#[derive(Debug, Deserialize)]
pub struct RecordReadingPayload {
    pub field_id: i32,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub wind_kmh: Option<f64>,
}

/// The recording supervisor comes from the request context, never from the
/// payload.
pub async fn record_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<RecordReadingPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;

    if let Some(humidity) = payload.humidity_pct {
        if !(0.0..=100.0).contains(&humidity) {
            return Err(FarmError::Validation(
                "Humidity must be between 0 and 100.".to_string(),
            ));
        }
    }

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO environmental_readings
         (field_id, temperature_c, humidity_pct, rainfall_mm, wind_kmh, recorded_by)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING reading_id",
    )
    .bind(payload.field_id)
    .bind(payload.temperature_c)
    .bind(payload.humidity_pct)
    .bind(payload.rainfall_mm)
    .bind(payload.wind_kmh)
    .bind(claims.user_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row.0))
}
