//! PostgreSQL storage for pushed authorization requests.
//!
//! Records live in the `octofhir_auth.pushed_authorization_requests` table.
//! Consumption is a single conditional `UPDATE`, so concurrent responses for
//! the same `request_uri` race on the row and exactly one wins, across any
//! number of server instances.

use octofhir_auth::oauth::PushedAuthorizationRequest;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use time::OffsetDateTime;

use crate::{PgPool, StorageError, StorageResult};

// =============================================================================
// Pushed Authorization Request Storage
// =============================================================================

/// Pushed authorization request storage operations.
pub struct ParStorage<'a> {
    pool: &'a PgPool,
}

type ParTuple = (
    String,
    String,
    serde_json::Value,
    OffsetDateTime,
    OffsetDateTime,
    Option<OffsetDateTime>,
);

impl<'a> ParStorage<'a> {
    /// Create a new storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a newly pushed request.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the reference is already taken.
    pub async fn create(&self, request: &PushedAuthorizationRequest) -> StorageResult<()> {
        let result = query(
            r#"
            INSERT INTO octofhir_auth.pushed_authorization_requests
                (jti, client_id, request, created_at, expires_at, consumed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&request.jti)
        .bind(&request.client_id)
        .bind(&request.request)
        .bind(request.created_at)
        .bind(request.expires_at)
        .bind(request.consumed_at)
        .execute(self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx_core::Error::Database(e)) if e.is_unique_violation() => Err(
                StorageError::conflict(format!("pushed request {} already exists", request.jti)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Find a record by reference.
    ///
    /// Expired records are filtered out unless `include_expired` is set.
    /// Consumed records are always returned.
    pub async fn find_by_jti(
        &self,
        jti: &str,
        include_expired: bool,
    ) -> StorageResult<Option<ParRow>> {
        let row: Option<ParTuple> = query_as(
            r#"
            SELECT jti, client_id, request, created_at, expires_at, consumed_at
            FROM octofhir_auth.pushed_authorization_requests
            WHERE jti = $1 AND ($2 OR expires_at > NOW())
            "#,
        )
        .bind(jti)
        .bind(include_expired)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ParRow::from_tuple))
    }

    /// Mark a record as consumed.
    ///
    /// Returns `None` if the record does not exist or was consumed already.
    pub async fn consume(&self, jti: &str) -> StorageResult<Option<ParRow>> {
        let row: Option<ParTuple> = query_as(
            r#"
            UPDATE octofhir_auth.pushed_authorization_requests
            SET consumed_at = NOW()
            WHERE jti = $1 AND consumed_at IS NULL
            RETURNING jti, client_id, request, created_at, expires_at, consumed_at
            "#,
        )
        .bind(jti)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ParRow::from_tuple))
    }

    /// Delete expired records.
    ///
    /// Returns the number of records deleted.
    pub async fn cleanup_expired(&self) -> StorageResult<u64> {
        let result = query(
            r#"
            DELETE FROM octofhir_auth.pushed_authorization_requests
            WHERE expires_at <= NOW()
            "#,
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Row from the pushed_authorization_requests table.
#[derive(Debug, Clone)]
pub struct ParRow {
    /// Reference identifier.
    pub jti: String,
    /// Client that pushed the request.
    pub client_id: String,
    /// Pushed parameters (JSONB).
    pub request: serde_json::Value,
    /// When the request was pushed.
    pub created_at: OffsetDateTime,
    /// When the reference expires.
    pub expires_at: OffsetDateTime,
    /// When the reference was used, if it was.
    pub consumed_at: Option<OffsetDateTime>,
}

impl ParRow {
    fn from_tuple(row: ParTuple) -> Self {
        Self {
            jti: row.0,
            client_id: row.1,
            request: row.2,
            created_at: row.3,
            expires_at: row.4,
            consumed_at: row.5,
        }
    }
}

impl From<ParRow> for PushedAuthorizationRequest {
    fn from(row: ParRow) -> Self {
        Self {
            jti: row.jti,
            client_id: row.client_id,
            request: row.request,
            created_at: row.created_at,
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
        }
    }
}
