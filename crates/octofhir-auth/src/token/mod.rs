//! Token signing support.
//!
//! This module provides the key material used to sign JWT-secured
//! authorization responses.

pub mod jwt;

pub use jwt::{Jwk, Jwks, JwtError, SigningAlgorithm, SigningKeyPair};
