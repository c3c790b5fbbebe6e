use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{FarmError, FarmResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_supervisor(&self) -> bool {
        self.role == "supervisor" || self.role == "admin"
    }

    /// Authorization gate: admins only. Runs before any data access so a
    /// failure leaves no partial effects.
    pub fn require_admin(&self) -> FarmResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(FarmError::Forbidden(
                "Administrator access required.".to_string(),
            ))
        }
    }

    /// Authorization gate: supervisors and admins.
    pub fn require_supervisor(&self) -> FarmResult<()> {
        if self.is_supervisor() {
            Ok(())
        } else {
            Err(FarmError::Forbidden(
                "Supervisor access required.".to_string(),
            ))
        }
    }
}

pub fn get_jwt_secret() -> Vec<u8> {
    std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using insecure default!");
            "insecure-development-secret-key-replace-me-immediately".to_string()
        })
        .into_bytes()
}

pub fn issue_token(user_id: i32, username: &str, role: &str) -> FarmResult<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(12))
        .map(|t| t.timestamp() as usize)
        .unwrap_or(0);
    let claims = Claims {
        sub: username.to_string(),
        user_id,
        username: username.to_string(),
        role: role.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(&get_jwt_secret()),
    )
    .map_err(|e| FarmError::Internal(format!("Token encoding failed: {}", e)))
}

/// Decodes the Bearer token and attaches [`Claims`] to request extensions.
/// Everything under /api/ except the public allow-list requires a token.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    let path = request.uri().path();
    let public_routes = ["/api/auth/login", "/api/ping"];

    if !path.starts_with("/api/") || public_routes.contains(&path) {
        return Ok(next.run(request).await);
    }

    let auth_header = match request.headers().get(header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    if !auth_header.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = &auth_header["Bearer ".len()..];

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&get_jwt_secret()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(token_data.claims);

    Ok(next.run(request).await)
}
