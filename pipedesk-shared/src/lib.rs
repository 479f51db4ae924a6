//! # PipeDesk Shared Library
//!
//! Shared types, models and business logic used by the PipeDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and CRUD operations
//! - `auth`: Sessions, password hashing, RBAC table, axum middleware
//! - `automation`: Task-template engine and checklist auto-closure
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod automation;
pub mod db;
pub mod models;

/// Current version of the PipeDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
