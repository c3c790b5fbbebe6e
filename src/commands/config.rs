use axum::extract::{Json, State};
use axum::Extension;
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::error::{FarmError, FarmResult};
use crate::middleware::auth::{issue_token, Claims};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> FarmResult<Json<LoginResponse>> {
    if payload.username.trim().is_empty() || payload.password.trim().is_empty() {
        return Err(FarmError::Validation(
            "Username and password are required.".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role, created_at, updated_at
         FROM users WHERE username = $1",
    )
    .bind(&payload.username)
    .fetch_optional(&state.pool)
    .await?;

    let user = user.ok_or_else(|| FarmError::Auth("Invalid username or password.".to_string()))?;
    let password_hash = user
        .password_hash
        .as_deref()
        .ok_or_else(|| FarmError::Auth("Account has no password set.".to_string()))?;

    if !verify(&payload.password, password_hash)? {
        return Err(FarmError::Auth("Invalid username or password.".to_string()));
    }

    let token = issue_token(user.id, &user.username, &user.role)?;
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
        role: user.role,
    }))
}

pub async fn get_all_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> FarmResult<Json<Vec<User>>> {
    claims.require_admin()?;
    let users = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, role, created_at, updated_at
         FROM users ORDER BY username",
    )
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> FarmResult<Json<i32>> {
    claims.require_admin()?;

    if payload.username.trim().is_empty() {
        return Err(FarmError::Validation("Username is required.".to_string()));
    }
    if payload.password.len() < 4 {
        return Err(FarmError::Validation(
            "Password must be at least 4 characters.".to_string(),
        ));
    }
    if !matches!(payload.role.as_str(), "admin" | "supervisor") {
        return Err(FarmError::Validation(
            "Role must be 'admin' or 'supervisor'.".to_string(),
        ));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)?;
    let row: (i32,) = sqlx::query_as(
        "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(payload.username.trim())
    .bind(password_hash)
    .bind(&payload.role)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(row.0))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user_id: i32,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateUserRequest>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;

    if let Some(role) = &payload.role {
        if !matches!(role.as_str(), "admin" | "supervisor") {
            return Err(FarmError::Validation(
                "Role must be 'admin' or 'supervisor'.".to_string(),
            ));
        }
        sqlx::query("UPDATE users SET role = $1, updated_at = now() WHERE id = $2")
            .bind(role)
            .bind(payload.user_id)
            .execute(&state.pool)
            .await?;
    }

    if let Some(password) = &payload.password {
        if password.len() < 4 {
            return Err(FarmError::Validation(
                "Password must be at least 4 characters.".to_string(),
            ));
        }
        let password_hash = hash(password, DEFAULT_COST)?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash)
            .bind(payload.user_id)
            .execute(&state.pool)
            .await?;
    }

    Ok(Json(()))
}

#[derive(Debug, Deserialize)]
pub struct DeleteUserRequest {
    pub user_id: i32,
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteUserRequest>,
) -> FarmResult<Json<()>> {
    claims.require_admin()?;
    if payload.user_id == claims.user_id {
        return Err(FarmError::Validation(
            "You cannot delete your own account.".to_string(),
        ));
    }
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(payload.user_id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(FarmError::NotFound("User not found.".to_string()));
    }
    Ok(Json(()))
}
