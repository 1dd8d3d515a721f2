//! Storage traits for authorization data.
//!
//! This module defines the storage interface for pushed authorization
//! requests and an in-memory implementation of it.
//!
//! # Implementations
//!
//! - [`InMemoryParStorage`] - process-local storage for tests and
//!   single-instance deployments
//! - `octofhir-auth-postgres` - PostgreSQL storage backend

pub mod memory;
pub mod par;

pub use memory::InMemoryParStorage;
pub use par::{FindOptions, PushedAuthorizationRequestStorage};
