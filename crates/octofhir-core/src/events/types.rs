//! Event types for the authorization lifecycle event system.
//!
//! - `AuthorizationEventType` - Kind of lifecycle notification
//! - `AuthorizationEvent` - Notification emitted by the authorization endpoint

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Type of authorization lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationEventType {
    /// An authorization response is about to be delivered to the client.
    #[serde(rename = "authorization.success")]
    Success,
}

impl AuthorizationEventType {
    /// Returns the wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationEventType::Success => "authorization.success",
        }
    }
}

impl std::fmt::Display for AuthorizationEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification emitted by the authorization endpoint.
///
/// Carries the request context the response was produced for and the final
/// response parameters, exactly as they are handed to the delivery handler.
/// Observers receive a clone and cannot influence the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationEvent {
    /// Type of event
    pub event_type: AuthorizationEventType,
    /// Client the response is addressed to
    pub client_id: String,
    /// Resolved response mode (e.g. `query`, `form_post.jwt`)
    pub response_mode: String,
    /// Redirect target of the response
    pub redirect_uri: String,
    /// Issuer advertised for this client
    pub issuer: String,
    /// Pushed authorization request consumed by this response, if any
    pub par_jti: Option<String>,
    /// Final response parameters
    pub parameters: IndexMap<String, String>,
    /// Timestamp of the event
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl AuthorizationEvent {
    /// Create an `authorization.success` event.
    pub fn success(
        client_id: impl Into<String>,
        response_mode: impl Into<String>,
        redirect_uri: impl Into<String>,
        issuer: impl Into<String>,
        parameters: IndexMap<String, String>,
    ) -> Self {
        Self {
            event_type: AuthorizationEventType::Success,
            client_id: client_id.into(),
            response_mode: response_mode.into(),
            redirect_uri: redirect_uri.into(),
            issuer: issuer.into(),
            par_jti: None,
            parameters,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// Set the consumed pushed authorization request reference.
    pub fn with_par_jti(mut self, jti: impl Into<String>) -> Self {
        self.par_jti = Some(jti.into());
        self
    }

    /// Names of the response parameters, in delivery order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.keys().map(String::as_str).collect()
    }
}
