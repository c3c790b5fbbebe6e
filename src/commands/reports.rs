use axum::extract::{Json, Query, State};
use axum::Extension;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::DbPool;
use crate::error::FarmResult;
use crate::logic::charts::{count_by, count_by_ordered, monthly_histogram, ChartSeries};
use crate::logic::expiry::{summarize, ExpirySummary};
use crate::middleware::auth::Claims;
use crate::state::AppState;

#[derive(Debug, Serialize, FromRow)]
pub struct DashboardStats {
    pub active_crops: Option<i64>,
    pub pending_requests: Option<i64>,
    pub open_issues: Option<i64>,
    pub low_stock_items: Option<i64>,
    pub expiring_batches: Option<i64>,
    pub readings_this_week: Option<i64>,
}

pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<DashboardStats>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let stats = dashboard_stats_internal(&state.pool, today).await?;
    Ok(Json(stats))
}

pub async fn dashboard_stats_internal(
    pool: &DbPool,
    today: NaiveDate,
) -> FarmResult<DashboardStats> {
    let sql = r#"
        SELECT
            (SELECT COUNT(*) FROM crops WHERE status = 'active') as active_crops,
            (SELECT COUNT(*) FROM stock_requests WHERE status = 'pending') as pending_requests,
            (SELECT COUNT(*) FROM crop_issues WHERE status = 'open') as open_issues,
            (SELECT COUNT(*) FROM inventory_items WHERE quantity <= reorder_level) as low_stock_items,
            (SELECT COUNT(*) FROM inventory_batches
             WHERE expiry_date IS NOT NULL AND expiry_date >= $1
               AND expiry_date <= $1 + INTERVAL '30 days') as expiring_batches,
            (SELECT COUNT(*) FROM environmental_readings
             WHERE reading_time >= $1 - INTERVAL '7 days') as readings_this_week
    "#;

    Ok(sqlx::query_as::<_, DashboardStats>(sql)
        .bind(today)
        .fetch_one(pool)
        .await?)
}

#[derive(Debug, Serialize)]
pub struct CropReport {
    pub by_status: ChartSeries,
    pub by_stage: ChartSeries,
}

pub async fn crop_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<CropReport>> {
    claims.require_supervisor()?;
    let report = crop_report_internal(&state.pool).await?;
    Ok(Json(report))
}

pub async fn crop_report_internal(pool: &DbPool) -> FarmResult<CropReport> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT status, growth_stage FROM crops")
            .fetch_all(pool)
            .await?;

    Ok(CropReport {
        by_status: count_by(rows.iter().map(|(status, _)| status)),
        by_stage: count_by_ordered(
            rows.iter().map(|(_, stage)| stage),
            &super::crops::GROWTH_STAGES,
        ),
    })
}

#[derive(Debug, Serialize)]
pub struct InventoryReport {
    pub expiry: ExpirySummary,
    pub by_category: ChartSeries,
    pub low_stock_count: i64,
}

pub async fn inventory_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<InventoryReport>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();
    let report = inventory_report_internal(&state.pool, today).await?;
    Ok(Json(report))
}

pub async fn inventory_report_internal(
    pool: &DbPool,
    today: NaiveDate,
) -> FarmResult<InventoryReport> {
    let expiries: Vec<(NaiveDate,)> = sqlx::query_as(
        "SELECT expiry_date FROM inventory_batches WHERE expiry_date IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;

    let categories: Vec<(String,)> = sqlx::query_as(
        "SELECT COALESCE(c.category_name, 'Uncategorized') FROM inventory_items i
         LEFT JOIN inventory_categories c ON c.category_id = i.category_id",
    )
    .fetch_all(pool)
    .await?;

    let low_stock: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM inventory_items WHERE quantity <= reorder_level",
    )
    .fetch_one(pool)
    .await?;

    Ok(InventoryReport {
        expiry: summarize(expiries.iter().map(|(d,)| d), today),
        by_category: count_by(categories.iter().map(|(c,)| c)),
        low_stock_count: low_stock.0,
    })
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub waste: ChartSeries,
    pub usage: ChartSeries,
    pub purchases: ChartSeries,
}

/// Twelve-month histograms feeding the yearly activity charts.
pub async fn monthly_report(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<YearQuery>,
) -> FarmResult<Json<MonthlyReport>> {
    claims.require_supervisor()?;
    let year = query
        .year
        .unwrap_or_else(|| chrono::Local::now().date_naive().year());
    let report = monthly_report_internal(&state.pool, year).await?;
    Ok(Json(report))
}

pub async fn monthly_report_internal(pool: &DbPool, year: i32) -> FarmResult<MonthlyReport> {
    let waste_dates: Vec<(NaiveDate,)> =
        sqlx::query_as("SELECT wasted_at FROM waste_management")
            .fetch_all(pool)
            .await?;
    let usage_dates: Vec<(NaiveDate,)> =
        sqlx::query_as("SELECT used_at FROM inventory_usage")
            .fetch_all(pool)
            .await?;
    let purchase_dates: Vec<(NaiveDate,)> =
        sqlx::query_as("SELECT order_date FROM purchases")
            .fetch_all(pool)
            .await?;

    Ok(MonthlyReport {
        year,
        waste: monthly_histogram(waste_dates.iter().map(|(d,)| d), year),
        usage: monthly_histogram(usage_dates.iter().map(|(d,)| d), year),
        purchases: monthly_histogram(purchase_dates.iter().map(|(d,)| d), year),
    })
}
