//! Quizbot Store: storage adapters.
//!
//! `PgStorage` persists to PostgreSQL through sqlx; `InMemoryStorage` keeps
//! everything in process for single-node runs and tests.

pub mod memory;
pub mod pg_storage;
pub mod schema;
