//! OAuth 2.0 authorization response stage.
//!
//! This module takes the parameters produced for an authorization request
//! and delivers them to the client:
//!
//! - Single use of pushed authorization requests (RFC 9126)
//! - `state` echo and `iss` injection (RFC 9207)
//! - Per-tenant issuer resolution
//! - `query`, `fragment` and `form_post` response modes, plain or
//!   JWT-secured (JARM)
//! - `authorization.success` lifecycle events
//!
//! # Submodules
//!
//! - [`authorize`] - Resolved request context
//! - [`par`] - Pushed authorization request records
//! - [`interaction`] - User interactions carrying the pushed request reference
//! - [`params`] - Response parameter map
//! - [`shaper`] - Response shaping rules
//! - [`issuer`] - Issuer resolution
//! - [`response_mode`] - Response mode names and defaults
//! - [`jarm`] - JWT-secured responses
//! - [`delivery`] - Delivery strategy per response mode
//! - [`respond`] - The responder tying it together
//!
//! # Example
//!
//! ```ignore
//! use octofhir_auth::oauth::{AuthorizationContext, AuthorizationResponder};
//!
//! let responder = AuthorizationResponder::from_config(&config, par_storage)?;
//! let ctx = AuthorizationContext::new(client, params)?.with_par(par);
//!
//! let delivery = responder.respond(&ctx, &code_issuer).await?;
//! ```

pub mod authorize;
pub mod delivery;
pub mod interaction;
pub mod issuer;
pub mod jarm;
pub mod par;
pub mod params;
pub mod respond;
pub mod response_mode;
pub mod shaper;

pub use authorize::{AuthorizationContext, AuthorizationParams};
pub use delivery::{Delivery, ResponseModes};
pub use interaction::Interaction;
pub use issuer::{
    IssuerPurpose, IssuerResolver, StaticIssuer, TenantIssuer, issuer_resolver_from_config,
};
pub use jarm::{DEFAULT_SIGNING_KEY_ID, RESPONSE_PARAM, ResponseSigner};
pub use par::{
    PushedAuthorizationRequest, REQUEST_URI_PREFIX, REQUEST_URI_REJECTED, jti_from_request_uri,
};
pub use params::ResponseParameters;
pub use respond::{AuthorizationProcessor, AuthorizationResponder, ParLocator};
pub use response_mode::ResponseMode;
pub use shaper::{needs_issuer, shape_response};
