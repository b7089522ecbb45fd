//! Handlers for custody transitions: assign, unassign, maintenance,
//! release.
//!
//! Each endpoint is a single-asset transaction: read the current row,
//! plan the transition in `stockroom_core::custody`, write through the
//! `last_updated` guard, append the audit entry. A guard miss re-reads
//! the winner's state and re-plans once, so the loser's idempotency check
//! runs against the post-state; a second miss surfaces a conflict.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use stockroom_core::custody::{self, CustodyChange, CustodyState};
use stockroom_core::error::CoreError;
use stockroom_core::status::AssetStatus;
use stockroom_core::types::DbId;
use stockroom_db::models::asset::Asset;
use stockroom_db::repositories::{AssetRepo, UserRepo};

use crate::activity::record_activity;
use crate::error::{AppError, AppResult};
use crate::handlers::assets::token_for;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for assigning an asset.
///
/// The display name is resolved through the user directory rather than
/// trusted from the caller, so `custodian_name` cannot diverge from it.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: DbId,
}

/// Run a planned custody transition through the guarded-write loop.
async fn apply_custody<F>(
    state: &AppState,
    admin: &AuthUser,
    id: DbId,
    plan: F,
) -> AppResult<Json<DataResponse<Asset>>>
where
    F: Fn(&CustodyState, &str) -> Result<CustodyChange, CoreError>,
{
    let mut first_read: Option<(AssetStatus, Option<DbId>)> = None;

    for attempt in 0..2 {
        let current = AssetRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("Asset", id)))?;

        let custody_state = current.custody_state()?;

        // On the retry after a guard miss, a custody change made by the
        // winner must not be silently overridden: the loser surfaces a
        // conflict instead. A concurrent non-custody edit (name, location)
        // is harmless and the transition is re-planned against it.
        let observed = (custody_state.status, custody_state.custodian_id);
        match first_read {
            Some(before) if before != observed => {
                return Err(AppError::Core(CoreError::Conflict(
                    "Asset custody changed concurrently; please retry".into(),
                )));
            }
            _ => first_read = Some(observed),
        }

        let change = plan(&custody_state, &current.name)?;

        // Custody transitions always touch display-identity fields, so
        // the scan token is regenerated with the new field set.
        let mut fields = current.fields()?;
        fields.status = change.status;
        fields.custodian_id = change.custodian_id;
        fields.custodian_name = change.custodian_name.clone();
        fields.last_custodian_name = change.last_custodian_name.clone();
        fields.date_assigned = change.date_assigned;
        let token = token_for(id, &fields);

        match AssetRepo::update_guarded(&state.pool, id, current.last_updated, &fields, &token)
            .await?
        {
            Some(updated) => {
                record_activity(
                    &state.pool,
                    state.config.audit_retention_days,
                    admin,
                    Some(id),
                    change.action,
                    Some(change.details),
                )
                .await;

                tracing::info!(
                    asset_id = id,
                    action = change.action,
                    user_id = admin.user_id,
                    "Custody transition applied",
                );
                return Ok(Json(DataResponse { data: updated }));
            }
            None if attempt == 0 => {
                tracing::debug!(asset_id = id, "Concurrent write detected, retrying");
            }
            None => break,
        }
    }

    Err(AppError::Core(CoreError::Conflict(
        "Asset was modified concurrently; please retry".into(),
    )))
}

/// POST /api/v1/assets/{id}/assign
///
/// Assign the asset to a user. Admin only. Rejects with a conflict when
/// the asset is already held by the same user.
pub async fn assign_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AssignRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", input.user_id)))?;

    apply_custody(&state, &admin, id, |cur, name| {
        custody::plan_assign(cur, name, user.id, &user.username, Utc::now())
    })
    .await
}

/// POST /api/v1/assets/{id}/unassign
///
/// Clear the asset's custodian and return it to the available pool.
/// Admin only.
pub async fn unassign_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    apply_custody(&state, &admin, id, custody::plan_unassign).await
}

/// POST /api/v1/assets/{id}/maintenance
///
/// Move the asset into maintenance. Admin only.
pub async fn enter_maintenance(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    apply_custody(&state, &admin, id, custody::plan_maintenance).await
}

/// POST /api/v1/assets/{id}/release
///
/// Release the asset back to the available pool, from maintenance or
/// from use. Admin only.
pub async fn release_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    apply_custody(&state, &admin, id, custody::plan_release).await
}
