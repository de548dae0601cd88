//! SQL adapters for workshop persistence.
//!
//! One diesel code path serves both `PostgreSQL` and SQLite; the backend is
//! chosen once from [`crate::config::StorageConfig`].

mod models;
mod pool;
mod repository;
mod schema;

pub use pool::{WorkshopPgPool, WorkshopPool, WorkshopSqlitePool};
pub use repository::{SCHEMA_SQL, SqlWorkshopStore};
