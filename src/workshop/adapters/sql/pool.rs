//! Connection pools for the supported SQL backends.

use crate::config::{StorageBackend, StorageConfig};
use crate::workshop::ports::{WorkshopRepositoryError, WorkshopRepositoryResult};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;

/// `PostgreSQL` connection pool type used by workshop adapters.
pub type WorkshopPgPool = Pool<ConnectionManager<PgConnection>>;

/// SQLite connection pool type used by workshop adapters.
pub type WorkshopSqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Pool for whichever backend was selected at startup.
#[derive(Debug, Clone)]
pub enum WorkshopPool {
    /// `PostgreSQL` pool.
    Postgres(WorkshopPgPool),
    /// SQLite pool.
    Sqlite(WorkshopSqlitePool),
}

/// Connection checked out from a [`WorkshopPool`].
pub(super) enum PooledWorkshopConnection {
    Postgres(PooledConnection<ConnectionManager<PgConnection>>),
    Sqlite(PooledConnection<ConnectionManager<SqliteConnection>>),
}

/// Runs `$body` with `$conn` bound to the concrete diesel connection.
///
/// The body is compiled once per backend, so it may only use query DSL that
/// both `PostgreSQL` and SQLite support.
macro_rules! with_connection {
    ($connection:expr, $conn:ident => $body:expr) => {
        match $connection {
            $crate::workshop::adapters::sql::pool::PooledWorkshopConnection::Postgres(pooled) => {
                let $conn: &mut ::diesel::pg::PgConnection = pooled;
                $body
            }
            $crate::workshop::adapters::sql::pool::PooledWorkshopConnection::Sqlite(pooled) => {
                let $conn: &mut ::diesel::sqlite::SqliteConnection = pooled;
                $body
            }
        }
    };
}

pub(super) use with_connection;

impl WorkshopPool {
    /// Builds a pool for the configured backend.
    ///
    /// In-memory SQLite databases are private to a connection, so their pool
    /// is pinned to one long-lived connection.
    ///
    /// # Errors
    ///
    /// Returns [`WorkshopRepositoryError::Persistence`] when the initial
    /// connections cannot be established.
    pub fn connect(config: &StorageConfig) -> WorkshopRepositoryResult<Self> {
        match &config.backend {
            StorageBackend::Postgres { url } => Pool::builder()
                .max_size(config.pool_size)
                .build(ConnectionManager::<PgConnection>::new(url.as_str()))
                .map(Self::Postgres)
                .map_err(WorkshopRepositoryError::persistence),
            StorageBackend::Sqlite { path } => {
                let builder = Pool::builder().connection_customizer(Box::new(SqlitePragmas));
                let sized = if config.backend.is_in_memory() {
                    builder.max_size(1).idle_timeout(None).max_lifetime(None)
                } else {
                    builder.max_size(config.pool_size)
                };
                sized
                    .build(ConnectionManager::<SqliteConnection>::new(path.as_str()))
                    .map(Self::Sqlite)
                    .map_err(WorkshopRepositoryError::persistence)
            }
        }
    }

    /// Returns the backend name for log output.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Sqlite(_) => "sqlite",
        }
    }

    pub(super) fn get(&self) -> WorkshopRepositoryResult<PooledWorkshopConnection> {
        match self {
            Self::Postgres(pool) => pool
                .get()
                .map(PooledWorkshopConnection::Postgres)
                .map_err(WorkshopRepositoryError::persistence),
            Self::Sqlite(pool) => pool
                .get()
                .map(PooledWorkshopConnection::Sqlite)
                .map_err(WorkshopRepositoryError::persistence),
        }
    }
}

/// Enables foreign keys and a busy timeout on every SQLite connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}
