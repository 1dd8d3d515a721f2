//! JWKS endpoint for verifying JWT-secured authorization responses.
//!
//! Clients using the `*.jwt` response modes fetch the signer's public key
//! from here. A configured signing key keeps the set stable across restarts.
//!
//! # References
//!
//! - [RFC 7517 - JSON Web Key](https://tools.ietf.org/html/rfc7517)

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::oauth::ResponseSigner;

/// Handler for `GET /.well-known/jwks.json`.
///
/// Returns 200 OK with the response signer's public key. Clients may cache
/// the set for an hour.
pub async fn jwks_handler(State(signer): State<Arc<ResponseSigner>>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        Json(signer.jwks()),
    )
}
