//! Pushed authorization request storage trait.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Hide expired records unless the caller asks for them explicitly
//! - Make `consume` an atomic conditional update
//! - Clean up expired records periodically
//!
//! # Security Considerations
//!
//! A `request_uri` must authorize exactly one authorization response. Two
//! concurrent `consume` calls for the same reference, possibly on different
//! server instances, must never both succeed.

use async_trait::async_trait;

use crate::AuthResult;
use crate::oauth::par::PushedAuthorizationRequest;

/// Lookup options for [`PushedAuthorizationRequestStorage::find_by_jti`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    /// Return the record even if it has expired.
    ///
    /// The single-use check at response time cares about reuse, not
    /// freshness: a flow that started in time may finish after expiry.
    pub ignore_expiration: bool,
}

impl FindOptions {
    /// Options that also return expired records.
    #[must_use]
    pub fn ignoring_expiration() -> Self {
        Self {
            ignore_expiration: true,
        }
    }
}

/// Storage trait for pushed authorization requests.
///
/// # Implementations
///
/// Implementations are provided for:
/// - In-memory (in this crate)
/// - PostgreSQL (in `octofhir-auth-postgres` crate)
#[async_trait]
pub trait PushedAuthorizationRequestStorage: Send + Sync {
    /// Stores a newly pushed request.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn create(&self, request: &PushedAuthorizationRequest) -> AuthResult<()>;

    /// Finds a record by its reference.
    ///
    /// # Returns
    ///
    /// Returns `Some(record)` if found, `None` otherwise. Expired records
    /// are only returned with `ignore_expiration`. Consumed records are
    /// returned, so callers can tell reuse apart from an unknown reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_jti(
        &self,
        jti: &str,
        options: FindOptions,
    ) -> AuthResult<Option<PushedAuthorizationRequest>>;

    /// Marks a record as consumed.
    ///
    /// # Atomicity
    ///
    /// The transition from unconsumed to consumed must be a single
    /// conditional update. Of several concurrent calls for the same
    /// reference, exactly one succeeds.
    ///
    /// # Returns
    ///
    /// Returns the consumed record.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRequestUri` if the record is missing or
    /// was already consumed, or a storage error.
    async fn consume(&self, jti: &str) -> AuthResult<PushedAuthorizationRequest>;

    /// Deletes expired records.
    ///
    /// # Returns
    ///
    /// Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
