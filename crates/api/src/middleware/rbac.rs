//! Role-gating extractors layered over [`AuthUser`].
//!
//! Declaring `RequireAdmin(admin)` in a handler signature is the whole
//! authorization check: extraction fails with 403 before the handler
//! body runs. Write routes use [`RequireAdmin`]; scan resolution and
//! plain reads use [`RequireAuth`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stockroom_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Admits only principals with the `admin` role.
pub struct RequireAdmin(pub AuthUser);

/// Admits any authenticated principal. Spelled out (rather than taking
/// [`AuthUser`] directly) so route intent reads off the signature.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(Self)
    }
}
