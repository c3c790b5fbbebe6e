use axum::extract::{Json, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ListQuery;
use crate::db::{DbPool, SoilReading, SoilTreatment};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;

/// Readings below this nitrogen level get flagged in the listing.
pub const NITROGEN_FLOOR_PPM: f64 = 10.0;

const READING_FILTER: FilterSpec = FilterSpec::new(&["f.field_name"])
    .with_category("r.field_id")
    .with_date("r.reading_date");

const TREATMENT_FILTER: FilterSpec =
    FilterSpec::new(&["f.field_name", "t.treatment_type", "t.product_used"])
        .with_category("t.field_id")
        .with_date("t.treatment_date");

#[derive(Debug, Serialize)]
pub struct SoilReadingRow {
    #[serde(flatten)]
    pub reading: SoilReading,
    pub low_nitrogen: bool,
}

pub async fn list_readings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<SoilReadingRow>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let readings = list_readings_internal(&state.pool, &query, today).await?;
    Ok(Json(readings))
}

pub async fn list_readings_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<SoilReadingRow>> {
    let mut sql = String::from(
        "SELECT r.*, f.field_name FROM soil_nutrients r
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
    sql.push_str(" ORDER BY r.reading_date DESC, r.reading_id DESC");

    let q = sqlx::query_as::<_, SoilReading>(&sql);
    let readings = bind_params(q, &params).fetch_all(pool).await?;

    Ok(readings
        .into_iter()
        .map(|reading| {
            let low_nitrogen = reading
                .nitrogen_ppm
                .map(|n| n < NITROGEN_FLOOR_PPM)
                .unwrap_or(false);
            SoilReadingRow {
                reading,
                low_nitrogen,
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct AddReadingPayload {
    pub field_id: i32,
    pub nitrogen_ppm: Option<f64>,
    pub phosphorus_ppm: Option<f64>,
    pub potassium_ppm: Option<f64>,
    pub ph_level: Option<f64>,
    pub reading_date: Option<NaiveDate>,
}

pub async fn add_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddReadingPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;

    if let Some(ph) = payload.ph_level {
        if !(0.0..=14.0).contains(&ph) {
            return Err(FarmError::Validation(
                "pH must be between 0 and 14.".to_string(),
            ));
        }
    }

    let reading_date = payload
        .reading_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO soil_nutrients
         (field_id, nitrogen_ppm, phosphorus_ppm, potassium_ppm, ph_level, recorded_by, reading_date)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING reading_id",
    )
    .bind(payload.field_id)
    .bind(payload.nitrogen_ppm)
    .bind(payload.phosphorus_ppm)
    .bind(payload.potassium_ppm)
    .bind(payload.ph_level)
    .bind(claims.user_id)
    .bind(reading_date)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row.0))
}

#[derive(Debug, Deserialize)]
pub struct DeleteReadingPayload {
    pub reading_id: i32,
}

pub async fn delete_reading(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteReadingPayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    let result = sqlx::query("DELETE FROM soil_nutrients WHERE reading_id = $1")
        .bind(payload.reading_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::NotFound("Reading not found.".to_string()));
    }
    Ok(Json(()))
}

pub async fn list_treatments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<SoilTreatment>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();

    let mut sql = String::from(
        "SELECT t.*, f.field_name FROM soil_treatments t
         JOIN fields f ON f.field_id = t.field_id",
    );
    let (clause, params) = TREATMENT_FILTER.build(
        query.search.as_deref(),
        query.field_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY t.treatment_date DESC, t.treatment_id DESC");

    let q = sqlx::query_as::<_, SoilTreatment>(&sql);
    let treatments = bind_params(q, &params).fetch_all(&state.pool).await?;
    Ok(Json(treatments))
}

#[derive(Debug, Deserialize)]
pub struct AddTreatmentPayload {
    pub field_id: i32,
    pub treatment_type: String,
    pub product_used: Option<String>,
    pub quantity_used: Option<String>,
    pub treatment_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub async fn add_treatment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddTreatmentPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;
    if payload.treatment_type.trim().is_empty() {
        return Err(FarmError::Validation(
            "Treatment type is required.".to_string(),
        ));
    }
    let treatment_date = payload
        .treatment_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO soil_treatments
         (field_id, treatment_type, product_used, quantity_used, applied_by, treatment_date, notes)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING treatment_id",
    )
    .bind(payload.field_id)
    .bind(payload.treatment_type.trim())
    .bind(&payload.product_used)
    .bind(&payload.quantity_used)
    .bind(claims.user_id)
    .bind(treatment_date)
    .bind(&payload.notes)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row.0))
}

#[derive(Debug, Deserialize)]
pub struct DeleteTreatmentPayload {
    pub treatment_id: i32,
}

pub async fn delete_treatment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteTreatmentPayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    let result = sqlx::query("DELETE FROM soil_treatments WHERE treatment_id = $1")
        .bind(payload.treatment_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::NotFound("Treatment not found.".to_string()));
    }
    Ok(Json(()))
}
