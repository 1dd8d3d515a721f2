//! Pushed authorization requests (RFC 9126).
//!
//! A client pushes its authorization request parameters to the server ahead
//! of redirecting the user-agent and receives a `request_uri` reference in
//! return. The reference authorizes exactly one completed authorization
//! response.
//!
//! # Lifecycle
//!
//! 1. Record created when the client pushes the request
//! 2. User-agent arrives at the authorization endpoint with `request_uri`
//! 3. Record consumed right before the authorization response is produced
//! 4. Record cleaned up after expiration

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// URN prefix of `request_uri` values issued for pushed requests.
pub const REQUEST_URI_PREFIX: &str = "urn:ietf:params:oauth:request_uri:";

/// Error description for a reference that can no longer start a response.
pub const REQUEST_URI_REJECTED: &str = "request_uri is invalid, expired, or was already used";

/// Pushed authorization request stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedAuthorizationRequest {
    /// Reference identifier, the suffix of the `request_uri`.
    pub jti: String,

    /// Client that pushed the request.
    pub client_id: String,

    /// Pushed authorization request parameters.
    pub request: serde_json::Value,

    /// Timestamp when the request was pushed.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp after which the `request_uri` may no longer start a flow.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Timestamp when the reference was used for a response.
    /// None until consumed.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub consumed_at: Option<OffsetDateTime>,
}

impl PushedAuthorizationRequest {
    /// Creates a fresh, unconsumed record with a random reference.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        request: serde_json::Value,
        lifetime: Duration,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            jti: Self::generate_jti(),
            client_id: client_id.into(),
            request,
            created_at: now,
            expires_at: now + lifetime,
            consumed_at: None,
        }
    }

    /// Generates a random reference identifier.
    ///
    /// 256 bits from the thread-local CSPRNG, base64url-encoded without
    /// padding (43 characters).
    #[must_use]
    pub fn generate_jti() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the record has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the reference has been used for a response.
    ///
    /// Consumed records can never be consumed again.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the record can still start a flow.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }

    /// Returns the `request_uri` handed to the client.
    #[must_use]
    pub fn request_uri(&self) -> String {
        format!("{REQUEST_URI_PREFIX}{}", self.jti)
    }
}

/// Extracts the reference identifier from a `request_uri`.
///
/// Returns `None` if the value was not issued by this server.
#[must_use]
pub fn jti_from_request_uri(request_uri: &str) -> Option<&str> {
    request_uri
        .strip_prefix(REQUEST_URI_PREFIX)
        .filter(|jti| !jti.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PushedAuthorizationRequest {
        PushedAuthorizationRequest::new(
            "my-app",
            serde_json::json!({"response_type": "code", "state": "abc123"}),
            Duration::seconds(60),
        )
    }

    #[test]
    fn test_generate_jti_is_random() {
        let a = PushedAuthorizationRequest::generate_jti();
        let b = PushedAuthorizationRequest::generate_jti();
        assert_eq!(a.len(), 43);
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_record_is_valid() {
        let par = record();
        assert!(!par.is_expired());
        assert!(!par.is_consumed());
        assert!(par.is_valid());
    }

    #[test]
    fn test_expired_record() {
        let mut par = record();
        par.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        assert!(par.is_expired());
        assert!(!par.is_valid());
    }

    #[test]
    fn test_consumed_record() {
        let mut par = record();
        par.consumed_at = Some(OffsetDateTime::now_utc());
        assert!(par.is_consumed());
        assert!(!par.is_valid());
    }

    #[test]
    fn test_request_uri_round_trip() {
        let par = record();
        let uri = par.request_uri();
        assert!(uri.starts_with("urn:ietf:params:oauth:request_uri:"));
        assert_eq!(jti_from_request_uri(&uri), Some(par.jti.as_str()));
    }

    #[test]
    fn test_foreign_request_uri() {
        assert_eq!(jti_from_request_uri("https://client.example.com/req"), None);
        assert_eq!(jti_from_request_uri(REQUEST_URI_PREFIX), None);
    }

    #[test]
    fn test_serialization_skips_unconsumed() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["clientId"], "my-app");
        assert!(json.get("consumedAt").is_none());
    }
}
