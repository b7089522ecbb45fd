//! Domain core for the stockroom asset tracker.
//!
//! Pure logic only: no database access, no async, no I/O. The `db` and
//! `api` crates build on this crate for field validation, status
//! canonicalization, custody transition planning, scan identity
//! generation, audit detail handling, and bulk import row mapping.

pub mod audit;
pub mod custody;
pub mod error;
pub mod import;
pub mod registry;
pub mod roles;
pub mod scan;
pub mod status;
pub mod types;
