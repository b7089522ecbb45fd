//! Request-scoped principal extraction.
//!
//! The identity provider issues JWTs; this extractor validates one per
//! request and hands the handler an [`AuthUser`]. There is no
//! process-wide session state anywhere in the service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated principal behind the current request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Internal database id (from `claims.sub`).
    pub user_id: DbId,
    /// Username, recorded as the audit actor name.
    pub username: String,
    /// Role name (`"admin"` or `"user"`).
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == stockroom_core::roles::ROLE_ADMIN
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, CoreError> {
    let header = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    header.strip_prefix("Bearer ").ok_or_else(|| {
        CoreError::Unauthorized("Invalid Authorization format. Expected: Bearer <token>".into())
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.config.jwt.validate(token).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
