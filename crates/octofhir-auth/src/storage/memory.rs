//! In-memory pushed authorization request storage.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::par::{PushedAuthorizationRequest, REQUEST_URI_REJECTED};
use crate::storage::par::{FindOptions, PushedAuthorizationRequestStorage};

/// Process-local storage for pushed authorization requests.
///
/// `consume` holds the write lock across the check and the update, which
/// makes it atomic within one process. Deployments with several server
/// instances need a shared backend such as `octofhir-auth-postgres`.
#[derive(Debug, Default)]
pub struct InMemoryParStorage {
    records: RwLock<HashMap<String, PushedAuthorizationRequest>>,
}

impl InMemoryParStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PushedAuthorizationRequestStorage for InMemoryParStorage {
    async fn create(&self, request: &PushedAuthorizationRequest) -> AuthResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&request.jti) {
            return Err(AuthError::storage(format!(
                "pushed authorization request '{}' already exists",
                request.jti
            )));
        }
        records.insert(request.jti.clone(), request.clone());
        Ok(())
    }

    async fn find_by_jti(
        &self,
        jti: &str,
        options: FindOptions,
    ) -> AuthResult<Option<PushedAuthorizationRequest>> {
        let records = self.records.read().await;
        Ok(records
            .get(jti)
            .filter(|r| options.ignore_expiration || !r.is_expired())
            .cloned())
    }

    async fn consume(&self, jti: &str) -> AuthResult<PushedAuthorizationRequest> {
        let mut records = self.records.write().await;
        match records.get_mut(jti) {
            Some(record) if !record.is_consumed() => {
                record.consumed_at = Some(OffsetDateTime::now_utc());
                Ok(record.clone())
            }
            _ => Err(AuthError::invalid_request_uri(REQUEST_URI_REJECTED)),
        }
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| !r.is_expired());
        Ok((before - records.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;

    fn record() -> PushedAuthorizationRequest {
        PushedAuthorizationRequest::new(
            "my-app",
            serde_json::json!({"response_type": "code"}),
            Duration::seconds(60),
        )
    }

    fn expired() -> PushedAuthorizationRequest {
        let mut par = record();
        par.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        par
    }

    #[test]
    fn test_new_store_is_empty() {
        use tokio_test::block_on;

        let storage = InMemoryParStorage::new();
        assert!(block_on(storage.is_empty()));
        assert!(
            block_on(storage.find_by_jti("missing", FindOptions::default()))
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = InMemoryParStorage::new();
        let par = record();
        storage.create(&par).await.unwrap();

        let found = storage
            .find_by_jti(&par.jti, FindOptions::default())
            .await
            .unwrap();
        assert_eq!(found, Some(par));
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let storage = InMemoryParStorage::new();
        let par = record();
        storage.create(&par).await.unwrap();

        let err = storage.create(&par).await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_find_hides_expired_unless_asked() {
        let storage = InMemoryParStorage::new();
        let par = expired();
        storage.create(&par).await.unwrap();

        assert!(
            storage
                .find_by_jti(&par.jti, FindOptions::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            storage
                .find_by_jti(&par.jti, FindOptions::ignoring_expiration())
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_consume_once() {
        let storage = InMemoryParStorage::new();
        let par = record();
        storage.create(&par).await.unwrap();

        let consumed = storage.consume(&par.jti).await.unwrap();
        assert!(consumed.is_consumed());

        let err = storage.consume(&par.jti).await.unwrap_err();
        assert!(err.is_replay());
        assert_eq!(err.oauth_error_code(), "invalid_request_uri");

        let found = storage
            .find_by_jti(&par.jti, FindOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert!(found.is_consumed());
    }

    #[tokio::test]
    async fn test_consume_unknown_reference() {
        let storage = InMemoryParStorage::new();
        let err = storage.consume("missing").await.unwrap_err();
        assert!(err.is_replay());
    }

    #[tokio::test]
    async fn test_concurrent_consume_single_winner() {
        let storage = Arc::new(InMemoryParStorage::new());
        let par = record();
        storage.create(&par).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let storage = storage.clone();
            let jti = par.jti.clone();
            handles.push(tokio::spawn(async move { storage.consume(&jti).await }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let storage = InMemoryParStorage::new();
        storage.create(&record()).await.unwrap();
        storage.create(&expired()).await.unwrap();
        storage.create(&expired()).await.unwrap();

        assert_eq!(storage.cleanup_expired().await.unwrap(), 2);
        assert_eq!(storage.len().await, 1);
    }
}
