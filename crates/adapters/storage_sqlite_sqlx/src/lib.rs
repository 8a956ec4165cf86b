//! # climahub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `ConfigStore` port defined in `climahub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between the configuration snapshot and database rows
//!
//! ## Dependency rule
//! Depends on `climahub-app` (for port traits) and `climahub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod config_store;
mod error;
mod pool;

pub use config_store::SqliteConfigStore;
pub use error::StorageError;
pub use pool::{Config, Database};
