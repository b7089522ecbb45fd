//! Route definitions for the asset registry, custody transitions, and
//! bulk import.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{assets, custody, imports, scan};
use crate::state::AppState;

/// Asset routes mounted at `/assets`.
///
/// Write routes require the `admin` role (enforced by handler
/// extractors); reads require any authenticated principal.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/import", post(imports::import_assets))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/scan-code", get(scan::get_scan_payload))
        .route("/{id}/assign", post(custody::assign_asset))
        .route("/{id}/unassign", post(custody::unassign_asset))
        .route("/{id}/maintenance", post(custody::enter_maintenance))
        .route("/{id}/release", post(custody::release_asset))
}
