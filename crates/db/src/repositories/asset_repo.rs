//! Repository for the `assets` table.
//!
//! All mutating writes go through either `insert` (with a pre-allocated
//! id, so the scan token can be derived before the row exists) or
//! `update_guarded` (optimistic concurrency keyed on `last_updated`).

use sqlx::PgPool;
use stockroom_core::registry::AssetFields;
use stockroom_core::types::{DbId, Timestamp};

use crate::models::asset::{Asset, AssetListParams, LocationCount, StatusCount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, asset_type, category, subcategory, location, status, \
    custodian_id, custodian_name, last_custodian_name, date_assigned, \
    scan_token, serial_number, purchase_date, purchase_price, warranty, \
    image_ref, created_at, last_updated";

/// Default page size for asset listing.
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for asset listing.
const MAX_LIMIT: i64 = 200;

/// Provides CRUD operations for the asset registry.
pub struct AssetRepo;

impl AssetRepo {
    /// Reserve the next asset id from the table's sequence.
    ///
    /// The scan token is derived from the id, so the id must exist before
    /// the INSERT is issued.
    pub async fn next_id(pool: &PgPool) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT nextval(pg_get_serial_sequence('assets', 'id'))")
            .fetch_one(pool)
            .await
    }

    /// Insert a new asset under a pre-allocated id.
    pub async fn insert(
        pool: &PgPool,
        id: DbId,
        fields: &AssetFields,
        scan_token: &str,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (\
                id, name, asset_type, category, subcategory, location, status, \
                custodian_id, custodian_name, last_custodian_name, date_assigned, \
                scan_token, serial_number, purchase_date, purchase_price, warranty, \
                image_ref\
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.asset_type)
            .bind(&fields.category)
            .bind(&fields.subcategory)
            .bind(&fields.location)
            .bind(fields.status.as_str())
            .bind(fields.custodian_id)
            .bind(&fields.custodian_name)
            .bind(&fields.last_custodian_name)
            .bind(fields.date_assigned)
            .bind(scan_token)
            .bind(&fields.serial_number)
            .bind(fields.purchase_date)
            .bind(fields.purchase_price)
            .bind(&fields.warranty)
            .bind(&fields.image_ref)
            .fetch_one(pool)
            .await
    }

    /// Find an asset by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the asset bound to a scan token, if the token is current.
    pub async fn find_by_scan_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE scan_token = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List assets with optional filters and pagination, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &AssetListParams,
    ) -> Result<Vec<Asset>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
        let offset = params.offset.unwrap_or(0);

        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if params.name.is_some() {
            conditions.push(format!("name ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if params.asset_type.is_some() {
            conditions.push(format!("asset_type = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.location.is_some() {
            conditions.push(format!("location = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.custodian_id.is_some() {
            conditions.push(format!("custodian_id = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM assets {where_clause} \
             ORDER BY created_at DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let mut q = sqlx::query_as::<_, Asset>(&query);

        // Bind dynamic parameters in order.
        if let Some(ref name) = params.name {
            q = q.bind(format!("%{name}%"));
        }
        if let Some(ref asset_type) = params.asset_type {
            q = q.bind(asset_type);
        }
        if let Some(ref status) = params.status {
            q = q.bind(status);
        }
        if let Some(ref location) = params.location {
            q = q.bind(location);
        }
        if let Some(custodian_id) = params.custodian_id {
            q = q.bind(custodian_id);
        }

        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Replace an asset's mutable columns, guarded by the `last_updated`
    /// the caller read.
    ///
    /// Returns `None` when the row is gone or was modified since the read
    /// (the optimistic-concurrency conflict case); the caller re-reads and
    /// re-plans.
    pub async fn update_guarded(
        pool: &PgPool,
        id: DbId,
        expected_last_updated: Timestamp,
        fields: &AssetFields,
        scan_token: &str,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "UPDATE assets SET \
                name = $3, asset_type = $4, category = $5, subcategory = $6, \
                location = $7, status = $8, custodian_id = $9, custodian_name = $10, \
                last_custodian_name = $11, date_assigned = $12, scan_token = $13, \
                serial_number = $14, purchase_date = $15, purchase_price = $16, \
                warranty = $17, image_ref = $18, last_updated = NOW() \
             WHERE id = $1 AND last_updated = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(expected_last_updated)
            .bind(&fields.name)
            .bind(&fields.asset_type)
            .bind(&fields.category)
            .bind(&fields.subcategory)
            .bind(&fields.location)
            .bind(fields.status.as_str())
            .bind(fields.custodian_id)
            .bind(&fields.custodian_name)
            .bind(&fields.last_custodian_name)
            .bind(fields.date_assigned)
            .bind(scan_token)
            .bind(&fields.serial_number)
            .bind(fields.purchase_date)
            .bind(fields.purchase_price)
            .bind(&fields.warranty)
            .bind(&fields.image_ref)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete an asset. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Aggregates (dashboard)
    // -----------------------------------------------------------------------

    /// Total number of assets.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM assets")
            .fetch_one(pool)
            .await
    }

    /// Asset counts grouped by status.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*)::BIGINT AS count FROM assets \
             GROUP BY status ORDER BY count DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Asset counts grouped by location, largest first.
    pub async fn count_by_location(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<LocationCount>, sqlx::Error> {
        sqlx::query_as::<_, LocationCount>(
            "SELECT location, COUNT(*)::BIGINT AS count FROM assets \
             GROUP BY location ORDER BY count DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
