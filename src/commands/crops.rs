use axum::extract::{Json, Path, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ListQuery;
use crate::db::{Crop, CropActivity, CropIssue, DbPool, GrowthMilestone};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::logic::progress::{growth_progress, progress_tier, ProgressTier};
use crate::middleware::auth::Claims;
use crate::state::AppState;

/// Ordered lifecycle; `set_stage` only accepts these.
pub const GROWTH_STAGES: [&str; 5] =
    ["seedling", "vegetative", "flowering", "fruiting", "mature"];

const CROP_FILTER: FilterSpec = FilterSpec::new(&["c.crop_name", "c.variety", "f.field_name"])
    .with_category("c.field_id")
    .with_date("c.planting_date");

pub fn is_valid_stage(stage: &str) -> bool {
    GROWTH_STAGES.contains(&stage)
}

pub async fn list_crops(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<Crop>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let crops = list_crops_internal(&state.pool, &query, today).await?;
    Ok(Json(crops))
}

pub async fn list_crops_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<Crop>> {
    let mut sql = String::from(
        "SELECT c.*, f.field_name FROM crops c
         LEFT JOIN fields f ON f.field_id = c.field_id",
    );
    let (clause, params) = CROP_FILTER.build(
        query.search.as_deref(),
        query.field_id,
        query.date_range()?,
        today,
        1,
    );
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY c.planting_date DESC, c.crop_id DESC");

    let q = sqlx::query_as::<_, Crop>(&sql);
    Ok(bind_params(q, &params).fetch_all(pool).await?)
}

#[derive(Debug, Deserialize)]
pub struct CreateCropPayload {
    pub crop_name: String,
    pub variety: Option<String>,
    pub field_id: Option<i32>,
    pub planting_date: NaiveDate,
    pub expected_harvest: NaiveDate,
}

pub async fn create_crop(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCropPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;

    if payload.crop_name.trim().is_empty() {
        return Err(FarmError::Validation("Crop name is required.".to_string()));
    }
    if payload.expected_harvest < payload.planting_date {
        return Err(FarmError::Validation(
            "Expected harvest cannot precede the planting date.".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    let row: (i32,) = sqlx::query_as(
        "INSERT INTO crops (crop_name, variety, field_id, planting_date, expected_harvest)
         VALUES ($1, $2, $3, $4, $5) RETURNING crop_id",
    )
    .bind(payload.crop_name.trim())
    .bind(&payload.variety)
    .bind(payload.field_id)
    .bind(payload.planting_date)
    .bind(payload.expected_harvest)
    .fetch_one(&mut *tx)
    .await?;

    // Every crop starts with a seedling milestone so the history is complete.
    sqlx::query(
        "INSERT INTO growth_milestones (crop_id, growth_stage, recorded_by)
         VALUES ($1, 'seedling', $2)",
    )
    .bind(row.0)
    .bind(claims.user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(row.0))
}

#[derive(Debug, Deserialize)]
pub struct SetStagePayload {
    pub crop_id: i32,
    pub growth_stage: String,
    pub notes: Option<String>,
}

pub async fn set_stage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SetStagePayload>,
) -> FarmResult<Json<()>> {
    claims.require_supervisor()?;
    set_stage_internal(
        &state.pool,
        payload.crop_id,
        &payload.growth_stage,
        payload.notes,
        claims.user_id,
    )
    .await?;
    Ok(Json(()))
}

/// Stage update and the append-only milestone row commit together.
pub async fn set_stage_internal(
    pool: &DbPool,
    crop_id: i32,
    stage: &str,
    notes: Option<String>,
    user_id: i32,
) -> FarmResult<()> {
    if !is_valid_stage(stage) {
        return Err(FarmError::Validation(format!(
            "Unknown growth stage: {}",
            stage
        )));
    }

    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE crops SET growth_stage = $1, updated_at = now() WHERE crop_id = $2",
    )
    .bind(stage)
    .bind(crop_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::NotFound("Crop not found.".to_string()));
    }

    sqlx::query(
        "INSERT INTO growth_milestones (crop_id, growth_stage, notes, recorded_by)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(crop_id)
    .bind(stage)
    .bind(&notes)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn list_milestones(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(crop_id): Path<i32>,
) -> FarmResult<Json<Vec<GrowthMilestone>>> {
    claims.require_supervisor()?;
    let milestones = sqlx::query_as::<_, GrowthMilestone>(
        "SELECT * FROM growth_milestones WHERE crop_id = $1 ORDER BY recorded_at ASC",
    )
    .bind(crop_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(milestones))
}

/// Timeline row for the growth-stage progress view.
#[derive(Debug, Serialize)]
pub struct CropTimelineEntry {
    #[serde(flatten)]
    pub crop: Crop,
    pub progress: f64,
    pub tier: ProgressTier,
    pub days_to_harvest: i64,
}

pub async fn growth_timeline(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<CropTimelineEntry>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let entries = growth_timeline_internal(&state.pool, &query, today).await?;
    Ok(Json(entries))
}

pub async fn growth_timeline_internal(
    pool: &DbPool,
    query: &ListQuery,
    today: NaiveDate,
) -> FarmResult<Vec<CropTimelineEntry>> {
    let crops = list_crops_internal(pool, query, today).await?;
    Ok(crops
        .into_iter()
        .map(|crop| {
            let progress = growth_progress(crop.planting_date, crop.expected_harvest, today);
            let tier = progress_tier(progress);
            let days_to_harvest = (crop.expected_harvest - today).num_days();
            CropTimelineEntry {
                crop,
                progress,
                tier,
                days_to_harvest,
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct AddActivityPayload {
    pub crop_id: i32,
    pub activity_type: String,
    pub description: Option<String>,
    pub activity_date: Option<NaiveDate>,
}

pub async fn add_activity(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddActivityPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;
    if payload.activity_type.trim().is_empty() {
        return Err(FarmError::Validation(
            "Activity type is required.".to_string(),
        ));
    }
    let activity_date = payload
        .activity_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO crop_activities (crop_id, activity_type, description, performed_by, activity_date)
         VALUES ($1, $2, $3, $4, $5) RETURNING activity_id",
    )
    .bind(payload.crop_id)
    .bind(payload.activity_type.trim())
    .bind(&payload.description)
    .bind(claims.user_id)
    .bind(activity_date)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row.0))
}

pub async fn list_activities(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(crop_id): Path<i32>,
) -> FarmResult<Json<Vec<CropActivity>>> {
    claims.require_supervisor()?;
    let activities = sqlx::query_as::<_, CropActivity>(
        "SELECT * FROM crop_activities WHERE crop_id = $1 ORDER BY activity_date DESC",
    )
    .bind(crop_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(activities))
}

#[derive(Debug, Deserialize)]
pub struct ReportIssuePayload {
    pub crop_id: i32,
    pub issue_type: String,
    pub severity: Option<String>,
    pub description: Option<String>,
}

pub async fn report_issue(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ReportIssuePayload>,
) -> FarmResult<Json<i32>> {
    claims.require_supervisor()?;
    let severity = payload.severity.unwrap_or_else(|| "medium".to_string());
    if !matches!(severity.as_str(), "low" | "medium" | "high") {
        return Err(FarmError::Validation(format!(
            "Unknown severity: {}",
            severity
        )));
    }
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO crop_issues (crop_id, issue_type, severity, description, reported_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING issue_id",
    )
    .bind(payload.crop_id)
    .bind(payload.issue_type.trim())
    .bind(&severity)
    .bind(&payload.description)
    .bind(claims.user_id)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row.0))
}

#[derive(Debug, Deserialize)]
pub struct ResolveIssuePayload {
    pub issue_id: i32,
}

pub async fn resolve_issue(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ResolveIssuePayload>,
) -> FarmResult<Json<()>> {
    claims.require_supervisor()?;
    let result = sqlx::query(
        "UPDATE crop_issues SET status = 'resolved', resolved_at = now()
         WHERE issue_id = $1 AND status = 'open'",
    )
    .bind(payload.issue_id)
    .execute(&state.pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::Validation(
            "Issue not found or already resolved.".to_string(),
        ));
    }
    Ok(Json(()))
}

pub async fn list_issues(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(crop_id): Path<i32>,
) -> FarmResult<Json<Vec<CropIssue>>> {
    claims.require_supervisor()?;
    let issues = sqlx::query_as::<_, CropIssue>(
        "SELECT * FROM crop_issues WHERE crop_id = $1 ORDER BY reported_at DESC",
    )
    .bind(crop_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(issues))
}
