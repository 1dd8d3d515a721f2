//! Authorization request context.
//!
//! By the time an authorization response is produced, the request has been
//! validated and its client, response mode and originating pushed request
//! (if any) are known. This module holds that resolved context.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::oauth::interaction::Interaction;
use crate::oauth::par::PushedAuthorizationRequest;
use crate::oauth::response_mode::ResponseMode;
use crate::types::Client;

/// Authorization request parameters.
///
/// # Example
///
/// ```ignore
/// GET /authorize?
///   response_type=code
///   &client_id=my-app
///   &redirect_uri=https://app.example.com/callback
///   &state=abc123xyz
///   &response_mode=form_post
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationParams {
    /// Client identifier issued during registration.
    pub client_id: String,

    /// Redirect URI where the response will be sent.
    pub redirect_uri: String,

    /// Requested response type (`code`, `id_token`, `code id_token`, ...).
    pub response_type: String,

    /// Opaque value echoed back to the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Requested response mode, as sent by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mode: Option<String>,

    /// OpenID Connect nonce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl AuthorizationParams {
    /// Returns the `state` sent by the client, if any.
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

/// Resolved authorization request context.
#[derive(Debug, Clone)]
pub struct AuthorizationContext {
    /// Client the response is addressed to.
    pub client: Client,

    /// Request parameters.
    pub params: AuthorizationParams,

    /// Resolved response mode.
    pub response_mode: ResponseMode,

    /// Pushed request attached to this request, if the flow started with one.
    pub par: Option<PushedAuthorizationRequest>,

    /// Interaction the flow resumed from, if any.
    pub interaction: Option<Interaction>,
}

impl AuthorizationContext {
    /// Builds the context, resolving the response mode from the parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRequest` if the client id does not match
    /// or the requested response mode is unknown.
    pub fn new(client: Client, params: AuthorizationParams) -> Result<Self, AuthError> {
        if params.client_id != client.client_id {
            return Err(AuthError::invalid_request(
                "client_id does not match the authenticated client",
            ));
        }

        let response_mode =
            ResponseMode::resolve(params.response_mode.as_deref(), &params.response_type)?;

        Ok(Self {
            client,
            params,
            response_mode,
            par: None,
            interaction: None,
        })
    }

    /// Attaches the pushed request the flow started with.
    #[must_use]
    pub fn with_par(mut self, par: PushedAuthorizationRequest) -> Self {
        self.par = Some(par);
        self
    }

    /// Attaches the interaction the flow resumed from.
    #[must_use]
    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Redirect target of the response.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.params.redirect_uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AuthorizationParams {
        AuthorizationParams {
            client_id: "my-app".to_string(),
            redirect_uri: "https://app.example.com/cb".to_string(),
            response_type: "code".to_string(),
            state: Some("abc123".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_context_resolves_default_mode() {
        let ctx = AuthorizationContext::new(Client::new("my-app"), params()).unwrap();
        assert_eq!(ctx.response_mode, ResponseMode::Query);
        assert_eq!(ctx.redirect_uri(), "https://app.example.com/cb");
        assert!(ctx.par.is_none());
    }

    #[test]
    fn test_context_resolves_requested_mode() {
        let mut params = params();
        params.response_mode = Some("jwt".to_string());
        let ctx = AuthorizationContext::new(Client::new("my-app"), params).unwrap();
        assert_eq!(ctx.response_mode, ResponseMode::QueryJwt);
    }

    #[test]
    fn test_context_rejects_client_mismatch() {
        let err = AuthorizationContext::new(Client::new("other"), params()).unwrap_err();
        assert_eq!(err.oauth_error_code(), "invalid_request");
    }

    #[test]
    fn test_state_accessor() {
        let mut params = params();
        assert_eq!(params.state(), Some("abc123"));
        params.state = None;
        assert_eq!(params.state(), None);
    }
}
