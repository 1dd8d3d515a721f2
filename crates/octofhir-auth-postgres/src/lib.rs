//! PostgreSQL storage backend for OctoFHIR Auth
//!
//! Provides persistent storage for pushed authorization requests
//! (RFC 9126). Consuming a `request_uri` is an atomic conditional update,
//! so the single-use guarantee holds across server instances sharing the
//! database.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_auth_postgres::PostgresAuthStorage;
//!
//! let storage = PostgresAuthStorage::connect("postgres://localhost/octofhir").await?;
//! storage.migrate().await?;
//!
//! let responder = AuthorizationResponder::from_config(&config, storage.par_storage())?;
//! ```

pub mod par;
pub mod storage_adapters;

use std::sync::Arc;

use sqlx_core::pool::Pool;
use sqlx_core::query::query;
use sqlx_postgres::Postgres;
use tracing::info;

use octofhir_auth::storage::PushedAuthorizationRequestStorage;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use par::{ParRow, ParStorage};
pub use storage_adapters::ArcParStorage;

/// Schema statements, applied in order by [`PostgresAuthStorage::migrate`].
pub const SCHEMA: &[&str] = &[
    "CREATE SCHEMA IF NOT EXISTS octofhir_auth",
    r#"
    CREATE TABLE IF NOT EXISTS octofhir_auth.pushed_authorization_requests (
        jti TEXT PRIMARY KEY,
        client_id TEXT NOT NULL,
        request JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        expires_at TIMESTAMPTZ NOT NULL,
        consumed_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS pushed_authorization_requests_expires_at_idx
        ON octofhir_auth.pushed_authorization_requests (expires_at)
    "#,
];

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during auth storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// Record already exists.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` if this is a `Conflict` error.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns `true` if this is a database error.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Auth Storage
// =============================================================================

/// PostgreSQL storage backend for authorization data.
#[derive(Debug, Clone)]
pub struct PostgresAuthStorage {
    pool: Arc<PgPool>,
}

impl PostgresAuthStorage {
    /// Create new storage with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create new storage by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        use sqlx_core::pool::PoolOptions;
        let pool = PoolOptions::<Postgres>::new().connect(database_url).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Create the auth schema and tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub async fn migrate(&self) -> StorageResult<()> {
        for statement in SCHEMA {
            query(*statement).execute(self.pool.as_ref()).await?;
        }
        info!("Auth storage schema is up to date");
        Ok(())
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Pushed authorization request operations borrowing the pool.
    #[must_use]
    pub fn pushed_requests(&self) -> ParStorage<'_> {
        ParStorage::new(&self.pool)
    }

    /// Pushed authorization request storage for the responder.
    #[must_use]
    pub fn par_storage(&self) -> Arc<dyn PushedAuthorizationRequestStorage> {
        Arc::new(ArcParStorage::new(Arc::clone(&self.pool)))
    }
}

// =============================================================================
// Tests
// =============================================================================
