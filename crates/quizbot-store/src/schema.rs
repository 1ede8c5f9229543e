//! Database schema.
//!
//! The SQL lives in the workspace `migrations/` directory and is embedded at
//! compile time.

use sqlx::migrate::Migrator;

/// Migrations creating the `users`, `challenges`, `participants` and
/// `results` tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");
