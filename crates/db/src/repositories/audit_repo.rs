//! Repository for the `audit_entries` table.
//!
//! Entries are append-only; the only delete path is the retention sweep.

use sqlx::PgPool;
use stockroom_core::types::Timestamp;

use crate::models::audit::{AuditEntry, AuditQuery, NewAuditEntry};

/// Column list for `audit_entries` SELECT queries.
const COLUMNS: &str = "id, actor_id, actor_name, asset_id, action, details, timestamp";

/// Default page size for audit queries.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for audit queries.
const MAX_LIMIT: i64 = 500;

/// Provides append and query operations for audit entries.
pub struct AuditRepo;

impl AuditRepo {
    /// Append a new audit entry.
    pub async fn insert(pool: &PgPool, entry: &NewAuditEntry) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_entries (actor_id, actor_name, asset_id, action, details) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(entry.actor_id)
            .bind(&entry.actor_name)
            .bind(entry.asset_id)
            .bind(entry.action)
            .bind(&entry.details)
            .fetch_one(pool)
            .await
    }

    /// Query audit entries, most recent first, with filtering and
    /// pagination.
    pub async fn recent(
        pool: &PgPool,
        params: &AuditQuery,
    ) -> Result<Vec<AuditEntry>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        let (where_clause, bind_values, bind_idx) = build_audit_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_entries {where_clause} \
             ORDER BY timestamp DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, AuditEntry>(&query);
        for value in &bind_values {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count audit entries matching the given filter (for pagination
    /// metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_audit_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM audit_entries {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for value in &bind_values {
            q = match value {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }

        q.fetch_one(pool).await
    }

    /// Delete entries older than `cutoff`. Returns the number removed.
    pub async fn sweep_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM audit_entries WHERE timestamp < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit queries.
enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Build a WHERE clause and bind values from `AuditQuery` filter
/// parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The
/// `where_clause` is empty if no filters are active, or starts with
/// `WHERE `.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(asset_id) = params.asset_id {
        conditions.push(format!("asset_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(asset_id));
    }

    if let Some(actor_id) = params.actor_id {
        conditions.push(format!("actor_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(actor_id));
    }

    if let Some(ref action) = params.action {
        conditions.push(format!("action = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action.clone()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}
