//! Handlers for audit trail queries.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use stockroom_db::models::audit::{AuditPage, AuditQuery};
use stockroom_db::repositories::AuditRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/audit
///
/// Query audit entries, most recent first, with filters and pagination.
/// Admin only.
pub async fn list_audit_entries(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AuditQuery>,
) -> AppResult<impl IntoResponse> {
    let items = AuditRepo::recent(&state.pool, &params).await?;
    let total = AuditRepo::count(&state.pool, &params).await?;

    Ok(Json(DataResponse {
        data: AuditPage { items, total },
    }))
}
