//! Authorization response delivery.
//!
//! Each [`ResponseMode`] maps to one delivery strategy. The set of modes is
//! closed, so selecting a strategy cannot fail at runtime.
//!
//! | Mode            | Delivery                                        |
//! |-----------------|-------------------------------------------------|
//! | `query`         | 303 redirect, parameters in the query           |
//! | `fragment`      | 303 redirect, parameters in the fragment        |
//! | `form_post`     | auto-submitting HTML form                       |
//! | `*.jwt`         | same as above with a single signed `response`   |

use std::sync::Arc;

use url::Url;
use url::form_urlencoded;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationContext;
use crate::oauth::jarm::ResponseSigner;
use crate::oauth::params::ResponseParameters;
use crate::oauth::response_mode::ResponseMode;

/// A response ready to be written to the user-agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Redirect the user-agent to `location`.
    Redirect {
        /// Redirect target with the encoded parameters.
        location: String,
    },
    /// Auto-submit `fields` to `action` with an HTML form.
    FormPost {
        /// Form target (the redirect URI).
        action: String,
        /// Fields posted to the client.
        fields: ResponseParameters,
    },
}

impl Delivery {
    /// Returns the redirect location, for redirect deliveries.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect { location } => Some(location),
            Self::FormPost { .. } => None,
        }
    }

    /// Returns the posted fields, for form post deliveries.
    #[must_use]
    pub fn fields(&self) -> Option<&ResponseParameters> {
        match self {
            Self::Redirect { .. } => None,
            Self::FormPost { fields, .. } => Some(fields),
        }
    }
}

/// Delivery strategies for all response modes.
#[derive(Debug, Clone, Default)]
pub struct ResponseModes {
    signer: Option<Arc<ResponseSigner>>,
}

impl ResponseModes {
    /// Creates the plain strategies. JWT-secured modes are unavailable.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the JWT-secured modes with the given signer.
    #[must_use]
    pub fn with_signer(mut self, signer: Arc<ResponseSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Returns the response signer, if JWT-secured modes are enabled.
    #[must_use]
    pub fn signer(&self) -> Option<&Arc<ResponseSigner>> {
        self.signer.as_ref()
    }

    /// Returns `true` if the mode can be delivered with this setup.
    #[must_use]
    pub fn supports(&self, mode: ResponseMode) -> bool {
        !mode.is_jwt() || self.signer.is_some()
    }

    /// Delivers the response parameters to the redirect target using the
    /// context's response mode.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRequest` if `redirect_uri` is not an absolute URL
    /// - `AuthError::Configuration` for a JWT-secured mode without a signer
    /// - `AuthError::Internal` if signing fails
    pub fn deliver(
        &self,
        ctx: &AuthorizationContext,
        issuer: &str,
        redirect_uri: &str,
        params: ResponseParameters,
    ) -> AuthResult<Delivery> {
        let mode = ctx.response_mode;
        let url = Url::parse(redirect_uri)
            .map_err(|e| AuthError::invalid_request(format!("Invalid redirect_uri: {e}")))?;

        let params = if mode.is_jwt() {
            let signer = self.signer.as_ref().ok_or_else(|| {
                AuthError::configuration(format!(
                    "response_mode '{mode}' requires a response signer"
                ))
            })?;
            signer.secure(issuer, &ctx.client.client_id, &params)?
        } else {
            params
        };

        Ok(match mode.encoding() {
            ResponseMode::Fragment => fragment(url, &params),
            ResponseMode::FormPost => Delivery::FormPost {
                action: url.to_string(),
                fields: params,
            },
            _ => query(url, &params),
        })
    }
}

fn query(mut url: Url, params: &ResponseParameters) -> Delivery {
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter());
    }
    Delivery::Redirect {
        location: url.to_string(),
    }
}

fn fragment(mut url: Url, params: &ResponseParameters) -> Delivery {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    url.set_fragment(Some(&encoded));
    Delivery::Redirect {
        location: url.to_string(),
    }
}
