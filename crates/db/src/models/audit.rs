//! Audit entry model and DTOs.
//!
//! Audit entries are append-only: there is no update DTO and no
//! `updated_at` column. `asset_id` is a plain column without a foreign
//! key, so entries survive (and dangle past) asset deletion.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};

/// A row from the `audit_entries` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub actor_id: DbId,
    pub actor_name: String,
    pub asset_id: Option<DbId>,
    pub action: String,
    pub details: Option<String>,
    pub timestamp: Timestamp,
}

/// DTO for appending a new audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_id: DbId,
    pub actor_name: String,
    pub asset_id: Option<DbId>,
    pub action: &'static str,
    pub details: Option<String>,
}

/// Filter parameters for querying audit entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub asset_id: Option<DbId>,
    pub actor_id: Option<DbId>,
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated response for audit queries.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub items: Vec<AuditEntry>,
    pub total: i64,
}
