//! Route definitions for audit trail queries.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Audit routes mounted at `/audit`.
///
/// All routes require the `admin` role (enforced by handler extractors).
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit::list_audit_entries))
}
