//! Route definitions for scan resolution.

use axum::routing::post;
use axum::Router;

use crate::handlers::scan;
use crate::state::AppState;

/// Scan routes mounted at `/scan`.
///
/// Any authenticated principal may resolve a code.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(scan::resolve_scan))
}
