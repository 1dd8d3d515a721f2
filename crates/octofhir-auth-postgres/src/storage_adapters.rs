//! Arc-owning storage adapters.
//!
//! These adapters wrap the lifetime-based storage types and own an
//! `Arc<PgPool>`, so they can be handed to the responder as
//! `Arc<dyn PushedAuthorizationRequestStorage>`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use octofhir_auth::oauth::{PushedAuthorizationRequest, REQUEST_URI_REJECTED};
use octofhir_auth::storage::{FindOptions, PushedAuthorizationRequestStorage};
use octofhir_auth::{AuthError, AuthResult};

use crate::par::ParStorage;
use crate::{PgPool, StorageError};

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        AuthError::storage(e.to_string())
    }
}

// =============================================================================
// Arc-Owning PAR Storage
// =============================================================================

/// Arc-owning PostgreSQL pushed authorization request storage adapter.
#[derive(Clone)]
pub struct ArcParStorage {
    pool: Arc<PgPool>,
}

impl ArcParStorage {
    /// Create a new Arc-owning storage.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushedAuthorizationRequestStorage for ArcParStorage {
    async fn create(&self, request: &PushedAuthorizationRequest) -> AuthResult<()> {
        let storage = ParStorage::new(&self.pool);
        storage.create(request).await?;
        Ok(())
    }

    async fn find_by_jti(
        &self,
        jti: &str,
        options: FindOptions,
    ) -> AuthResult<Option<PushedAuthorizationRequest>> {
        let storage = ParStorage::new(&self.pool);
        let row = storage.find_by_jti(jti, options.ignore_expiration).await?;
        Ok(row.map(Into::into))
    }

    async fn consume(&self, jti: &str) -> AuthResult<PushedAuthorizationRequest> {
        let storage = ParStorage::new(&self.pool);
        match storage.consume(jti).await? {
            Some(row) => Ok(row.into()),
            None => {
                debug!(jti = %jti, "Pushed request missing or already consumed");
                Err(AuthError::invalid_request_uri(REQUEST_URI_REJECTED))
            }
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let storage = ParStorage::new(&self.pool);
        Ok(storage.cleanup_expired().await?)
    }
}
