//! User entity model.
//!
//! Users are owned by the external identity provider; this table mirrors
//! the subset the asset tracker needs for custody display names, import
//! username resolution, and role checks.

use serde::Serialize;
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    /// Role name (`"admin"` or `"user"`).
    pub role: String,
    pub created_at: Timestamp,
}
