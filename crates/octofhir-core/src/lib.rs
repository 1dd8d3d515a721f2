//! # octofhir-core
//!
//! Shared infrastructure for the OctoFHIR authorization endpoint.
//!
//! - [`events`] - Lifecycle event bus, observer hooks and their dispatcher

pub mod events;

pub use events::{
    AuthorizationEvent, AuthorizationEventType, AuthorizationHook, EventBroadcaster, HookDispatcher,
    HookError, HookRegistry, HookSystemBuilder,
};
