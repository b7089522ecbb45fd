//! Handler for physical-world scan resolution.
//!
//! A presented code (raw token or decoded payload JSON) resolves to
//! exactly one asset. A stale token -- one invalidated by a later edit --
//! is an expected "not found" outcome, not a system error.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use stockroom_core::audit::actions;
use stockroom_core::error::CoreError;
use stockroom_core::scan;
use stockroom_core::types::DbId;
use stockroom_db::repositories::AssetRepo;

use crate::activity::record_activity;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for scan resolution.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Raw scan token or the JSON payload decoded from a code.
    pub code: String,
    /// Free-text location where the scan happened; sanitized before it
    /// reaches the audit trail.
    #[serde(default)]
    pub scan_location: Option<String>,
}

/// POST /api/v1/scan
///
/// Resolve a scanned code to its asset. Any authenticated principal may
/// scan; every successful resolution is recorded with the requesting
/// principal as the actor.
pub async fn resolve_scan(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<ScanRequest>,
) -> AppResult<impl IntoResponse> {
    let token = scan::extract_token(&input.code)
        .ok_or_else(|| AppError::BadRequest("Scan code is empty".into()))?;

    let asset = AssetRepo::find_by_scan_token(&state.pool, &token)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Asset", &token)))?;

    let details = match input.scan_location {
        Some(ref location) if !location.trim().is_empty() => {
            format!("Scanned '{}' at {}", asset.name, location.trim())
        }
        _ => format!("Scanned '{}'", asset.name),
    };

    record_activity(
        &state.pool,
        state.config.audit_retention_days,
        &user,
        Some(asset.id),
        actions::SCANNED,
        Some(details),
    )
    .await;

    Ok(Json(DataResponse { data: asset }))
}

/// GET /api/v1/assets/{id}/scan-code
///
/// The payload to encode into the asset's printable code. Embeds the
/// display snapshot alongside the token so a decoded code renders
/// without a second lookup.
pub async fn get_scan_payload(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let asset = AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Asset", id)))?;

    let payload = scan::payload_for(
        &asset.scan_token,
        asset.id,
        &asset.name,
        &asset.asset_type,
        &asset.location,
        asset.parsed_status()?,
    );

    Ok(Json(DataResponse { data: payload }))
}
