//! HTTP integration for the authorization response stage.
//!
//! - `IntoResponse` for [`Delivery`](crate::oauth::Delivery) and
//!   [`AuthError`](crate::error::AuthError)
//! - [`render_form_post`] - auto-submitting page for `form_post` modes
//! - [`jwks_handler`] - public key of the response signer

pub mod error;
pub mod form_post;
pub mod jwks;
pub mod respond;

pub use form_post::render_form_post;
pub use jwks::jwks_handler;
