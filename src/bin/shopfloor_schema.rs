//! Creates the workshop tables in the configured database.
//!
//! Usage:
//!
//! ```text
//! DATABASE_URL=postgres://shop@localhost/taller shopfloor-schema
//! ```
//!
//! Without `DATABASE_URL` the SQLite file `taller_mecanico.db` in the
//! working directory is used. Existing tables are left untouched.

use shopfloor::config::StorageConfig;
use shopfloor::telemetry;
use shopfloor::workshop::adapters::sql::SqlWorkshopStore;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    telemetry::init()?;
    let config = StorageConfig::from_env()?;
    let store = SqlWorkshopStore::connect(&config)?;
    store.initialise_schema().await?;
    Ok(())
}
