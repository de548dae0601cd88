//! Storage configuration loaded from the environment.

use thiserror::Error;

/// Environment variable naming the database.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable overriding the connection pool size.
pub const POOL_SIZE_VAR: &str = "SHOPFLOOR_POOL_SIZE";

/// SQLite database file used when no `DATABASE_URL` is set.
pub const DEFAULT_SQLITE_PATH: &str = "taller_mecanico.db";

/// Connection pool size used when no override is set.
pub const DEFAULT_POOL_SIZE: u32 = 8;

/// Database engine selected at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// `PostgreSQL` server reached through a connection URL.
    Postgres {
        /// Connection URL, including the scheme.
        url: String,
    },
    /// SQLite database file, or `:memory:`.
    Sqlite {
        /// Database file path.
        path: String,
    },
}

impl StorageBackend {
    /// Chooses the backend for a database URL.
    ///
    /// `postgres://` and `postgresql://` URLs select `PostgreSQL`; anything
    /// else is treated as a SQLite path, with an optional `sqlite://` prefix
    /// removed.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let trimmed = url.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("postgres://") || lowered.starts_with("postgresql://") {
            return Self::Postgres {
                url: trimmed.to_owned(),
            };
        }
        let path = trimmed.strip_prefix("sqlite://").unwrap_or(trimmed);
        Self::Sqlite {
            path: path.to_owned(),
        }
    }

    /// Returns whether the backend is an in-memory SQLite database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        matches!(self, Self::Sqlite { path } if path == ":memory:")
    }
}

/// Resolved storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Selected database engine.
    pub backend: StorageBackend,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
}

impl StorageConfig {
    /// Creates a configuration with the default pool size.
    #[must_use]
    pub const fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Creates a configuration for a private in-memory SQLite database.
    #[must_use]
    pub fn in_memory_sqlite() -> Self {
        Self {
            backend: StorageBackend::Sqlite {
                path: ":memory:".to_owned(),
            },
            pool_size: 1,
        }
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Loads configuration from the process environment after reading any
    /// `.env` file in the working directory.
    ///
    /// | Env Var               | Default              |
    /// |-----------------------|----------------------|
    /// | `DATABASE_URL`        | `taller_mecanico.db` |
    /// | `SHOPFLOOR_POOL_SIZE` | `8`                  |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the pool size is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Err(err) if !err.not_found() => return Err(ConfigError::DotEnv(err.to_string())),
            _ => {}
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the pool size is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .map_or_else(
                || StorageBackend::Sqlite {
                    path: DEFAULT_SQLITE_PATH.to_owned(),
                },
                |url| StorageBackend::from_url(&url),
            );

        let pool_size = match lookup(POOL_SIZE_VAR) {
            Some(raw) => parse_pool_size(&raw)?,
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self { backend, pool_size })
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidPoolSize(raw.to_owned())),
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The pool size is not a positive integer.
    #[error("{POOL_SIZE_VAR} must be a positive integer, got '{0}'")]
    InvalidPoolSize(String),

    /// The `.env` file exists but could not be read.
    #[error("failed to load .env file: {0}")]
    DotEnv(String),
}
