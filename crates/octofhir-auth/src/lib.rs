//! # octofhir-auth
//!
//! Authorization response stage of the OctoFHIR authorization endpoint.
//!
//! This crate provides:
//! - Single-use enforcement for pushed authorization requests (RFC 9126)
//! - Response shaping: `state` echo and `iss` injection (RFC 9207)
//! - Single and multi-tenant issuer resolution
//! - Response delivery for `query`, `fragment`, `form_post` and their
//!   JWT-secured variants (JARM)
//! - `authorization.success` lifecycle events and an audit hook
//!
//! ## Overview
//!
//! Upstream stages authenticate the user, collect consent and mint codes or
//! tokens. This crate takes their output and delivers it, making sure a
//! `request_uri` completes at most one authorization response.
//!
//! ## Modules
//!
//! - [`config`] - Authorization endpoint configuration
//! - [`oauth`] - Responder, response modes, issuer resolution
//! - [`token`] - Response signing keys
//! - [`audit`] - Audit hook for authorization events
//! - [`storage`] - Pushed authorization request storage
//! - [`http`] - Axum integration

pub mod audit;
pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use audit::{AuditRecord, AuthorizationAuditHook};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, ErrorCategory};
pub use http::render_form_post;
pub use oauth::{
    AuthorizationContext, AuthorizationParams, AuthorizationProcessor, AuthorizationResponder,
    Delivery, Interaction, IssuerPurpose, IssuerResolver, ParLocator, PushedAuthorizationRequest,
    ResponseMode, ResponseModes, ResponseParameters, ResponseSigner, StaticIssuer, TenantIssuer,
};
pub use storage::{FindOptions, InMemoryParStorage, PushedAuthorizationRequestStorage};
pub use types::Client;

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use octofhir_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::audit::AuthorizationAuditHook;
    pub use crate::config::{AuthConfig, ConfigError};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::oauth::{
        AuthorizationContext, AuthorizationParams, AuthorizationProcessor,
        AuthorizationResponder, Delivery, Interaction, IssuerPurpose, IssuerResolver,
        PushedAuthorizationRequest, ResponseMode, ResponseModes, ResponseParameters,
        ResponseSigner, StaticIssuer, TenantIssuer,
    };
    pub use crate::storage::{FindOptions, InMemoryParStorage, PushedAuthorizationRequestStorage};
    pub use crate::token::{Jwks, SigningAlgorithm, SigningKeyPair};
    pub use crate::types::Client;
}
