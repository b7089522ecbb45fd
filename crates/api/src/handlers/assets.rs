//! Handlers for the asset registry: CRUD over tracked assets.
//!
//! Mutations follow the read -> plan -> guarded-write pattern: the
//! current row is loaded, the change is planned in `stockroom_core`, and
//! the write is guarded on the `last_updated` value that was read. A
//! guard miss re-reads and re-plans once before surfacing a conflict.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use stockroom_core::audit::actions;
use stockroom_core::error::CoreError;
use stockroom_core::registry::{self, AssetFields, AssetPatch, CreateAssetFields, CustodianPatch};
use stockroom_core::scan;
use stockroom_core::status::AssetStatus;
use stockroom_core::types::DbId;
use stockroom_db::models::asset::{Asset, AssetListParams};
use stockroom_db::repositories::{AssetRepo, UserRepo};

use crate::activity::record_activity;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Derive the scan token for an asset's current field set.
pub(crate) fn token_for(id: DbId, fields: &AssetFields) -> String {
    scan::generate_token(
        id,
        &fields.name,
        &fields.asset_type,
        &fields.location,
        fields.status,
        fields.custodian_name.as_deref(),
        Utc::now(),
    )
}

/// Insert a validated asset under a freshly allocated id and record the
/// `created` audit entry.
///
/// Shared between the create endpoint and the bulk import loop.
pub(crate) async fn insert_asset(
    state: &AppState,
    actor: &AuthUser,
    fields: AssetFields,
) -> Result<Asset, AppError> {
    let id = AssetRepo::next_id(&state.pool).await?;
    let token = token_for(id, &fields);
    let asset = AssetRepo::insert(&state.pool, id, &fields, &token).await?;

    record_activity(
        &state.pool,
        state.config.audit_retention_days,
        actor,
        Some(asset.id),
        actions::CREATED,
        Some(format!("Created asset '{}'", asset.name)),
    )
    .await;

    Ok(asset)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for creating an asset: the raw fields plus an optional
/// initial custodian.
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    #[serde(flatten)]
    pub fields: CreateAssetFields,
    #[serde(default)]
    pub custodian_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
///
/// List assets with optional filters. A status filter is canonicalized
/// before matching, so `?status=in_use` finds `In Use` assets.
pub async fn list_assets(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Query(mut params): Query<AssetListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(ref raw) = params.status {
        params.status = Some(AssetStatus::parse(raw)?.as_str().to_string());
    }

    let assets = AssetRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: assets }))
}

/// GET /api/v1/assets/{id}
///
/// Get a single asset by id.
pub async fn get_asset(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Asset", id)))?;
    Ok(Json(DataResponse { data: asset }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/assets
///
/// Register a new asset. Admin only.
pub async fn create_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAssetRequest>,
) -> AppResult<impl IntoResponse> {
    let custodian = match input.custodian_id {
        Some(user_id) => {
            let user = UserRepo::find_by_id(&state.pool, user_id)
                .await?
                .ok_or_else(|| AppError::Core(CoreError::not_found("User", user_id)))?;
            Some((user.id, user.username))
        }
        None => None,
    };

    let fields = registry::validate_create(&input.fields, custodian, Utc::now())?;
    let asset = insert_asset(&state, &admin, fields).await?;

    tracing::info!(
        asset_id = asset.id,
        name = %asset.name,
        user_id = admin.user_id,
        "Asset created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PUT /api/v1/assets/{id}
///
/// Apply a partial update. Admin only.
///
/// Emits one `updated` entry with the field-level diff, plus a semantic
/// entry when the status changed. Regenerates the scan token when a
/// display-identity field changed.
pub async fn update_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(patch): Json<AssetPatch>,
) -> AppResult<impl IntoResponse> {
    for attempt in 0..2 {
        let current = AssetRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("Asset", id)))?;
        let fields = current.fields()?;

        let custodian = match patch.custodian_id {
            None => CustodianPatch::Keep,
            Some(None) => CustodianPatch::Clear,
            Some(Some(user_id)) => {
                let user = UserRepo::find_by_id(&state.pool, user_id)
                    .await?
                    .ok_or_else(|| AppError::Core(CoreError::not_found("User", user_id)))?;
                CustodianPatch::Set {
                    user_id: user.id,
                    username: user.username,
                }
            }
        };

        let outcome = registry::apply_patch(&fields, &patch, &custodian, Utc::now())?;
        if outcome.changed.is_empty() {
            return Ok(Json(DataResponse { data: current }));
        }

        let token = if outcome.identity_changed {
            token_for(id, &outcome.fields)
        } else {
            current.scan_token.clone()
        };

        match AssetRepo::update_guarded(
            &state.pool,
            id,
            current.last_updated,
            &outcome.fields,
            &token,
        )
        .await?
        {
            Some(updated) => {
                let retention = state.config.audit_retention_days;
                record_activity(
                    &state.pool,
                    retention,
                    &admin,
                    Some(id),
                    actions::UPDATED,
                    Some(format!("Updated {}", outcome.changed.join("; "))),
                )
                .await;
                if let Some(status_action) = outcome.status_action {
                    record_activity(
                        &state.pool,
                        retention,
                        &admin,
                        Some(id),
                        status_action.action,
                        Some(status_action.details),
                    )
                    .await;
                }

                tracing::info!(asset_id = id, user_id = admin.user_id, "Asset updated");
                return Ok(Json(DataResponse { data: updated }));
            }
            None if attempt == 0 => {
                // Lost the race: re-read the winner's state and re-plan.
                tracing::debug!(asset_id = id, "Concurrent write detected, retrying");
            }
            None => break,
        }
    }

    Err(AppError::Core(CoreError::Conflict(
        "Asset was modified concurrently; please retry".into(),
    )))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/assets/{id}
///
/// Hard-delete an asset. Admin only. Past audit entries keep their (now
/// dangling) asset reference.
pub async fn delete_asset(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Asset", id)))?;

    if !AssetRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::not_found("Asset", id)));
    }

    record_activity(
        &state.pool,
        state.config.audit_retention_days,
        &admin,
        Some(id),
        actions::DELETED,
        Some(format!("Deleted asset '{}'", asset.name)),
    )
    .await;

    tracing::info!(asset_id = id, user_id = admin.user_id, "Asset deleted");

    Ok(Json(DataResponse {
        data: serde_json::json!({ "deleted": id }),
    }))
}
