//! Handler for the admin dashboard overview.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use stockroom_db::models::asset::{LocationCount, StatusCount};
use stockroom_db::models::audit::{AuditEntry, AuditQuery};
use stockroom_db::repositories::{AssetRepo, AuditRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Locations shown in the distribution list.
const LOCATION_LIMIT: i64 = 10;

/// Audit entries shown in the recent activity feed.
const ACTIVITY_LIMIT: i64 = 10;

/// Aggregated dashboard figures.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_assets: i64,
    pub by_status: Vec<StatusCount>,
    pub by_location: Vec<LocationCount>,
    pub recent_activity: Vec<AuditEntry>,
}

/// GET /api/v1/dashboard/stats
///
/// Asset totals, status/location distribution, and the recent activity
/// tail. Admin only.
pub async fn get_stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let total_assets = AssetRepo::count_all(&state.pool).await?;
    let by_status = AssetRepo::count_by_status(&state.pool).await?;
    let by_location = AssetRepo::count_by_location(&state.pool, LOCATION_LIMIT).await?;

    let recent_activity = AuditRepo::recent(
        &state.pool,
        &AuditQuery {
            limit: Some(ACTIVITY_LIMIT),
            ..AuditQuery::default()
        },
    )
    .await?;

    Ok(Json(DataResponse {
        data: DashboardStats {
            total_assets,
            by_status,
            by_location,
            recent_activity,
        },
    }))
}
