//! Repository for the `users` table.
//!
//! Read-only: user records are provisioned by the external identity
//! provider. The tracker resolves them for custody display names, import
//! username matching, and the admin assignment picker. The table is
//! small enough that the queries spell out their columns directly.

use sqlx::PgPool;
use stockroom_core::types::DbId;

use crate::models::user::User;

pub struct UserRepo;

impl UserRepo {
    /// Find a user by internal id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, role, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive, matching the unique
    /// index).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// All users, ordered for the assignment picker.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, role, created_at FROM users ORDER BY username")
            .fetch_all(pool)
            .await
    }
}
