//! Authorization lifecycle event system.
//!
//! This module provides the event infrastructure that decouples the
//! authorization endpoint from its observers (audit, metrics, webhooks).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Event Broadcaster                              │
//! │              (tokio::sync::broadcast channel)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//!          │                    │                    │
//!          ▼                    ▼                    ▼
//!    ┌──────────┐        ┌──────────┐        ┌──────────┐
//!    │  Hook 1  │        │  Hook 2  │        │  Hook 3  │
//!    │ (async)  │        │ (async)  │        │ (async)  │
//!    └──────────┘        └──────────┘        └──────────┘
//! ```
//!
//! Publishing never waits on an observer: the endpoint sends into the
//! broadcast channel and moves on. The dispatcher runs each hook in its own
//! task with a timeout and panic protection.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_core::events::{EventBroadcaster, HookSystemBuilder};
//!
//! let broadcaster = EventBroadcaster::new_shared();
//!
//! let registry = HookSystemBuilder::new()
//!     .register(audit_hook)
//!     .await
//!     .start(broadcaster.subscribe());
//! ```
//!
//! # Module Structure
//!
//! - [`types`]: Event type definitions
//! - [`broadcaster`]: Event broadcasting infrastructure
//! - [`hooks`]: Hook trait and error type
//! - [`registry`]: Hook registry and dispatcher

pub mod broadcaster;
pub mod hooks;
pub mod registry;
pub mod types;

pub use broadcaster::{DEFAULT_BUFFER_SIZE, EventBroadcaster};
pub use hooks::{AuthorizationHook, HookError};
pub use registry::{DEFAULT_HOOK_TIMEOUT, HookDispatcher, HookRegistry, HookSystemBuilder};
pub use types::{AuthorizationEvent, AuthorizationEventType};
