use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{FromRow, Pool, Postgres};
use std::str::FromStr;

use crate::error::{FarmError, FarmResult};

pub type DbPool = Pool<Postgres>;

pub async fn init_pool_with_options(opts: PgConnectOptions) -> FarmResult<DbPool> {
    // connect_lazy_with returns the pool immediately without validating the
    // connection; the first query will surface connectivity problems.
    Ok(PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .idle_timeout(std::time::Duration::from_secs(120))
        .max_lifetime(std::time::Duration::from_secs(300))
        .connect_lazy_with(opts))
}

pub async fn init_pool(database_url: &str) -> FarmResult<DbPool> {
    let opts = PgConnectOptions::from_str(database_url)
        .map_err(|e| FarmError::Internal(format!("Invalid DB URL: {}", e)))?
        .ssl_mode(PgSslMode::Prefer);

    init_pool_with_options(opts).await
}

pub async fn init_database(pool: &DbPool) -> FarmResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    ensure_seeds(pool).await?;
    tracing::info!("Database ready");
    Ok(())
}

async fn ensure_seeds(pool: &DbPool) -> FarmResult<()> {
    let admin_username = std::env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());

    let admin_exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&admin_username)
        .fetch_one(pool)
        .await
        .unwrap_or((0,));
    if admin_exists.0 == 0 {
        let hash = bcrypt::hash("admin", bcrypt::DEFAULT_COST)?;
        sqlx::query(
            "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, 'admin')
             ON CONFLICT DO NOTHING",
        )
        .bind(&admin_username)
        .bind(hash)
        .execute(pool)
        .await?;
        tracing::warn!(
            "Seeded admin user '{}' with the default password; change it immediately",
            admin_username
        );
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Field {
    pub field_id: i32,
    pub field_name: String,
    pub location: Option<String>,
    pub area_hectares: Option<f64>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Crop {
    pub crop_id: i32,
    pub crop_name: String,
    pub variety: Option<String>,
    pub field_id: Option<i32>,
    pub planting_date: NaiveDate,
    pub expected_harvest: NaiveDate,
    pub growth_stage: String,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub field_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CropActivity {
    pub activity_id: i32,
    pub crop_id: i32,
    pub activity_type: String,
    pub description: Option<String>,
    pub performed_by: Option<i32>,
    pub activity_date: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct CropIssue {
    pub issue_id: i32,
    pub crop_id: i32,
    pub issue_type: String,
    pub severity: String,
    pub description: Option<String>,
    pub status: String,
    pub reported_by: Option<i32>,
    pub reported_at: Option<NaiveDateTime>,
    pub resolved_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct GrowthMilestone {
    pub milestone_id: i32,
    pub crop_id: i32,
    pub growth_stage: String,
    pub notes: Option<String>,
    pub recorded_by: Option<i32>,
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryCategory {
    pub category_id: i32,
    pub category_name: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub supplier_id: i32,
    pub supplier_name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub item_id: i32,
    pub item_name: String,
    pub sku: String,
    pub category_id: Option<i32>,
    pub supplier_id: Option<i32>,
    pub quantity: i32,
    pub unit: String,
    pub reorder_level: i32,
    pub expiry_date: Option<NaiveDate>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub updated_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub category_name: Option<String>,
    #[sqlx(default)]
    pub supplier_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct InventoryBatch {
    pub batch_id: i32,
    pub item_id: i32,
    pub batch_code: String,
    pub quantity: i32,
    pub expiry_date: Option<NaiveDate>,
    pub received_at: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub item_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct UsageRecord {
    pub usage_id: i32,
    pub item_id: i32,
    pub quantity: i32,
    pub purpose: Option<String>,
    pub used_by: Option<i32>,
    pub used_at: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub item_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct WasteRecord {
    pub waste_id: i32,
    pub item_id: i32,
    pub quantity: i32,
    pub reason: String,
    pub recorded_by: Option<i32>,
    pub wasted_at: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub item_name: Option<String>,
    #[sqlx(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StockRequest {
    pub request_id: i32,
    pub item_id: i32,
    pub quantity: i32,
    pub priority: String,
    pub status: String,
    pub notes: Option<String>,
    pub requested_by: Option<i32>,
    pub requested_at: Option<NaiveDateTime>,
    pub reviewed_by: Option<i32>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub review_notes: Option<String>,
    pub fulfilled_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub item_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub purchase_id: i32,
    pub supplier_id: i32,
    pub order_date: NaiveDate,
    pub status: String,
    pub total_amount: i64,
    pub created_by: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub supplier_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PurchaseItem {
    pub purchase_item_id: i32,
    pub purchase_id: i32,
    pub item_id: Option<i32>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: i64,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DeliveryEvent {
    pub tracking_id: i32,
    pub purchase_id: i32,
    pub status: String,
    pub notes: Option<String>,
    pub recorded_by: Option<i32>,
    pub recorded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SoilReading {
    pub reading_id: i32,
    pub field_id: i32,
    pub nitrogen_ppm: Option<f64>,
    pub phosphorus_ppm: Option<f64>,
    pub potassium_ppm: Option<f64>,
    pub ph_level: Option<f64>,
    pub recorded_by: Option<i32>,
    pub reading_date: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub field_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SoilTreatment {
    pub treatment_id: i32,
    pub field_id: i32,
    pub treatment_type: String,
    pub product_used: Option<String>,
    pub quantity_used: Option<String>,
    pub applied_by: Option<i32>,
    pub treatment_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub field_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Staff {
    pub staff_id: i32,
    pub user_id: Option<i32>,
    pub full_name: String,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hired_at: Option<NaiveDate>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct StaffDocument {
    pub document_id: i32,
    pub staff_id: i32,
    pub document_type: String,
    pub original_name: String,
    pub stored_name: String,
    pub uploaded_by: Option<i32>,
    pub uploaded_at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct FieldAssignment {
    pub assignment_id: i32,
    pub staff_id: i32,
    pub field_id: i32,
    pub assigned_at: NaiveDate,
    #[sqlx(default)]
    pub field_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct EnvironmentalReading {
    pub reading_id: i32,
    pub field_id: i32,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub rainfall_mm: Option<f64>,
    pub wind_kmh: Option<f64>,
    pub recorded_by: Option<i32>,
    pub reading_time: Option<NaiveDateTime>,
    #[sqlx(default)]
    pub field_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub notification_id: i32,
    pub kind: String,
    pub message: String,
    pub item_id: Option<i32>,
    pub is_read: bool,
    pub created_at: Option<NaiveDateTime>,
}
