//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - DTOs / query parameter structs for the repository layer

pub mod asset;
pub mod audit;
pub mod user;
