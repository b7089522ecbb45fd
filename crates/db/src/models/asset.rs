//! Asset entity model and query parameter DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::custody::CustodyState;
use stockroom_core::error::CoreError;
use stockroom_core::registry::AssetFields;
use stockroom_core::status::AssetStatus;
use stockroom_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub name: String,
    pub asset_type: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub location: String,
    pub status: String,
    pub custodian_id: Option<DbId>,
    pub custodian_name: Option<String>,
    pub last_custodian_name: Option<String>,
    pub date_assigned: Option<Timestamp>,
    pub scan_token: String,
    pub serial_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<f64>,
    pub warranty: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl Asset {
    /// Parse the stored status string back into the closed enumeration.
    ///
    /// The column is written only from canonical forms, so a parse failure
    /// means corrupt data and surfaces as an internal error.
    pub fn parsed_status(&self) -> Result<AssetStatus, CoreError> {
        AssetStatus::parse(&self.status)
            .map_err(|_| CoreError::Internal(format!("Stored status '{}' is invalid", self.status)))
    }

    /// The custody-relevant fields, for transition planning.
    pub fn custody_state(&self) -> Result<CustodyState, CoreError> {
        Ok(CustodyState {
            status: self.parsed_status()?,
            custodian_id: self.custodian_id,
            custodian_name: self.custodian_name.clone(),
            last_custodian_name: self.last_custodian_name.clone(),
        })
    }

    /// The full mutable field set, for patch application.
    pub fn fields(&self) -> Result<AssetFields, CoreError> {
        Ok(AssetFields {
            name: self.name.clone(),
            asset_type: self.asset_type.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            location: self.location.clone(),
            status: self.parsed_status()?,
            custodian_id: self.custodian_id,
            custodian_name: self.custodian_name.clone(),
            last_custodian_name: self.last_custodian_name.clone(),
            date_assigned: self.date_assigned,
            serial_number: self.serial_number.clone(),
            purchase_date: self.purchase_date,
            purchase_price: self.purchase_price,
            warranty: self.warranty.clone(),
            image_ref: self.image_ref.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for listing assets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetListParams {
    /// Substring match on name (ILIKE).
    pub name: Option<String>,
    /// Exact match on asset type.
    pub asset_type: Option<String>,
    /// Exact match on canonical status string.
    pub status: Option<String>,
    /// Exact match on location.
    pub location: Option<String>,
    /// Exact match on custodian.
    pub custodian_id: Option<DbId>,
    /// Maximum results (default 50, max 200).
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Aggregates (dashboard)
// ---------------------------------------------------------------------------

/// Asset count per status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Asset count per location.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LocationCount {
    pub location: String,
    pub count: i64,
}
