//! OAuth 2.0 Client domain types.
//!
//! The response stage only needs the identifying part of a client
//! registration: its id, its tenant and its registered redirect URIs.

use serde::{Deserialize, Serialize};

/// OAuth 2.0 Client registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Tenant the client belongs to in multi-tenant deployments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Allowed redirect URIs for authorization responses.
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl Client {
    /// Creates a client without tenant.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            tenant: None,
            redirect_uris: Vec::new(),
        }
    }

    /// Assigns the client to a tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Adds an allowed redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uris.push(uri.into());
        self
    }

    /// Checks if the given redirect URI is allowed for this client.
    ///
    /// Uses exact string matching as required by OAuth 2.0 Security BCP.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }
}
