pub mod assets;
pub mod audit;
pub mod dashboard;
pub mod health;
pub mod scan;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /assets                      list (GET), create (POST, admin)
/// /assets/import               bulk import (POST, admin)
/// /assets/{id}                 get (GET), update (PUT, admin), delete (DELETE, admin)
/// /assets/{id}/scan-code       printable code payload (GET, any authed)
/// /assets/{id}/assign          assign custody (POST, admin)
/// /assets/{id}/unassign        clear custody (POST, admin)
/// /assets/{id}/maintenance     enter maintenance (POST, admin)
/// /assets/{id}/release         release to available (POST, admin)
///
/// /scan                        resolve a scanned code (POST, any authed)
///
/// /audit                       query audit entries (GET, admin)
///
/// /users                       list users (GET, admin)
/// /users/{id}                  get user (GET, admin)
///
/// /dashboard/stats             aggregated overview (GET, admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/assets", assets::router())
        .nest("/scan", scan::router())
        .nest("/audit", audit::router())
        .nest("/users", users::router())
        .nest("/dashboard", dashboard::router())
}
