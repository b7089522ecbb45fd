//! Handlers for the user directory.
//!
//! Users are provisioned by the external identity provider; these
//! endpoints are read-only lookups for assignment pickers and custody
//! display.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users
///
/// List all users. Admin only.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{id}
///
/// Get a single user by id. Admin only.
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", id)))?;
    Ok(Json(DataResponse { data: user }))
}
