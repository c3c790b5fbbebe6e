use axum::extract::{Json, Multipart, Path, Query, State};
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;

use super::ListQuery;
use crate::db::{FieldAssignment, Staff, StaffDocument};
use crate::error::{FarmError, FarmResult};
use crate::logic::filter::{append_clause, bind_params, FilterSpec};
use crate::middleware::auth::Claims;
use crate::state::AppState;
use crate::storage::DocumentStore;

const STAFF_FILTER: FilterSpec = FilterSpec::new(&["s.full_name", "s.position", "s.email"]);

pub async fn list_staff(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> FarmResult<Json<Vec<Staff>>> {
    claims.require_supervisor()?;
    let today = chrono::Local::now().date_naive();

    let mut sql = String::from("SELECT s.* FROM staff s");
    let (clause, params) = STAFF_FILTER.build(query.search.as_deref(), None, None, today, 1);
    append_clause(&mut sql, &clause, false);
    sql.push_str(" ORDER BY s.full_name");

    let q = sqlx::query_as::<_, Staff>(&sql);
    let staff = bind_params(q, &params).fetch_all(&state.pool).await?;
    Ok(Json(staff))
}

pub async fn list_assignments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(staff_id): Path<i32>,
) -> FarmResult<Json<Vec<FieldAssignment>>> {
    claims.require_supervisor()?;
    let assignments = sqlx::query_as::<_, FieldAssignment>(
        "SELECT a.*, f.field_name FROM staff_field_assignments a
         JOIN fields f ON f.field_id = a.field_id
         WHERE a.staff_id = $1 ORDER BY a.assigned_at DESC",
    )
    .bind(staff_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(assignments))
}

#[derive(Debug, Deserialize)]
pub struct AssignFieldPayload {
    pub staff_id: i32,
    pub field_id: i32,
    pub assigned_at: Option<NaiveDate>,
}

pub async fn assign_field(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AssignFieldPayload>,
) -> FarmResult<Json<i32>> {
    claims.require_admin()?;
    let assigned_at = payload
        .assigned_at
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO staff_field_assignments (staff_id, field_id, assigned_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (staff_id, field_id) DO UPDATE SET assigned_at = EXCLUDED.assigned_at
         RETURNING assignment_id",
    )
    .bind(payload.staff_id)
    .bind(payload.field_id)
    .bind(assigned_at)
    .fetch_one(&state.pool)
    .await?;
    Ok(Json(row.0))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(staff_id): Path<i32>,
) -> FarmResult<Json<Vec<StaffDocument>>> {
    claims.require_supervisor()?;
    let documents = sqlx::query_as::<_, StaffDocument>(
        "SELECT * FROM staff_documents WHERE staff_id = $1 ORDER BY uploaded_at DESC",
    )
    .bind(staff_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(documents))
}

/// Multipart upload: `staff_id`, `document_type` and a `file` part. The file
/// goes through the storage abstraction first; if the metadata insert fails
/// the stored file is removed so disk and table stay in step.
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> FarmResult<Json<i32>> {
    claims.require_admin()?;

    let mut staff_id: Option<i32> = None;
    let mut document_type: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FarmError::Validation(format!("Invalid upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "staff_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| FarmError::Validation(format!("Invalid upload: {}", e)))?;
                staff_id = Some(text.parse().map_err(|_| {
                    FarmError::Validation("staff_id must be an integer.".to_string())
                })?);
            }
            "document_type" => {
                document_type = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| FarmError::Validation(format!("Invalid upload: {}", e)))?,
                );
            }
            "file" => {
                file_name = field.file_name().map(|n| n.to_string());
                file_bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| FarmError::Validation(format!("Invalid upload: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let staff_id =
        staff_id.ok_or_else(|| FarmError::Validation("staff_id is required.".to_string()))?;
    let document_type = document_type
        .ok_or_else(|| FarmError::Validation("document_type is required.".to_string()))?;
    let original_name =
        file_name.ok_or_else(|| FarmError::Validation("A file is required.".to_string()))?;
    let bytes =
        file_bytes.ok_or_else(|| FarmError::Validation("A file is required.".to_string()))?;
    if bytes.is_empty() {
        return Err(FarmError::Validation("Uploaded file is empty.".to_string()));
    }

    let stored_name = state.documents.store(&original_name, &bytes)?;

    let inserted: FarmResult<(i32,)> = sqlx::query_as(
        "INSERT INTO staff_documents (staff_id, document_type, original_name, stored_name, uploaded_by)
         VALUES ($1, $2, $3, $4, $5) RETURNING document_id",
    )
    .bind(staff_id)
    .bind(&document_type)
    .bind(&original_name)
    .bind(&stored_name)
    .bind(claims.user_id)
    .fetch_one(&state.pool)
    .await
    .map_err(Into::into);

    match inserted {
        Ok((document_id,)) => Ok(Json(document_id)),
        Err(e) => {
            // Orphaned file cleanup; the metadata row is the source of truth.
            if let Err(cleanup) = state.documents.remove(&stored_name) {
                tracing::error!("Failed to clean up stored file {}: {}", stored_name, cleanup);
            }
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteDocumentPayload {
    pub document_id: i32,
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteDocumentPayload>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;

    let row: Option<(String,)> = sqlx::query_as(
        "DELETE FROM staff_documents WHERE document_id = $1 RETURNING stored_name",
    )
    .bind(payload.document_id)
    .fetch_optional(&state.pool)
    .await?;

    let stored_name = match row {
        Some((name,)) => name,
        None => return Err(FarmError::NotFound("Document not found.".to_string())),
    };

    state.documents.remove(&stored_name)?;
    Ok(Json(()))
}
