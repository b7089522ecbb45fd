//! Best-effort audit trail writes.
//!
//! An audit append is a secondary write: the triggering asset mutation is
//! authoritative and must never be rolled back or failed because the
//! trail could not be written. Failures are recorded to the operational
//! log instead. After each successful append, entries older than the
//! configured retention window are swept.

use chrono::Utc;
use stockroom_core::audit::sanitize_details;
use stockroom_core::types::DbId;
use stockroom_db::models::audit::NewAuditEntry;
use stockroom_db::repositories::AuditRepo;
use stockroom_db::DbPool;

use crate::middleware::auth::AuthUser;

/// Append an audit entry for a state-changing operation.
///
/// Details are sanitized before storage. Insert and sweep failures are
/// logged via `tracing::error!` and swallowed.
pub async fn record_activity(
    pool: &DbPool,
    retention_days: i64,
    actor: &AuthUser,
    asset_id: Option<DbId>,
    action: &'static str,
    details: Option<String>,
) {
    let entry = NewAuditEntry {
        actor_id: actor.user_id,
        actor_name: actor.username.clone(),
        asset_id,
        action,
        details: details.as_deref().map(sanitize_details),
    };

    match AuditRepo::insert(pool, &entry).await {
        Ok(written) => {
            tracing::debug!(entry_id = written.id, action, "Activity recorded");

            let cutoff = Utc::now() - chrono::Duration::days(retention_days);
            match AuditRepo::sweep_older_than(pool, cutoff).await {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::debug!(removed, retention_days, "Audit retention sweep");
                }
                Err(err) => {
                    tracing::error!(error = %err, "Audit retention sweep failed");
                }
            }
        }
        Err(err) => {
            tracing::error!(error = %err, action, asset_id, "Audit write failed");
        }
    }
}
