//! Common types used across the authorization modules.
//!
//! ## Domain Types
//!
//! - [`Client`] - OAuth 2.0 client registration, as seen by the response stage

pub mod client;

pub use client::Client;
