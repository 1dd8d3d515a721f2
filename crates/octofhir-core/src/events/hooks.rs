//! Hook traits for the authorization event system.
//!
//! Hooks are asynchronous observers that react to lifecycle events.
//! They are designed to be:
//! - **Async**: Non-blocking, run in separate tokio tasks
//! - **Isolated**: Errors in one hook don't affect others or the endpoint
//! - **Composable**: Multiple hooks can react to the same event

use async_trait::async_trait;

use super::types::{AuthorizationEvent, AuthorizationEventType};

/// Error type for hook operations.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Hook execution failed with a message.
    #[error("Hook execution failed: {0}")]
    Execution(String),

    /// Hook failed to send to an internal channel.
    #[error("Channel send failed: {0}")]
    Channel(String),

    /// Hook failed due to serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error with source.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HookError {
    /// Create an execution error from a string.
    pub fn execution(msg: impl Into<String>) -> Self {
        HookError::Execution(msg.into())
    }

    /// Create a channel error from a string.
    pub fn channel(msg: impl Into<String>) -> Self {
        HookError::Channel(msg.into())
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        HookError::Serialization(err.to_string())
    }
}

/// Trait for authorization lifecycle hooks.
///
/// # Implementation Notes
///
/// - Hooks should be quick and non-blocking
/// - For heavy work, send to an internal channel and return immediately
/// - Errors are logged but don't propagate to the event source
/// - Hooks run in isolated tokio tasks with panic protection
///
/// # Example
///
/// ```ignore
/// struct WebhookHook {
///     tx: mpsc::Sender<AuthorizationEvent>,
/// }
///
/// #[async_trait]
/// impl AuthorizationHook for WebhookHook {
///     fn name(&self) -> &str { "webhook" }
///
///     async fn handle(&self, event: &AuthorizationEvent) -> Result<(), HookError> {
///         self.tx.try_send(event.clone()).map_err(|e| HookError::channel(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait AuthorizationHook: Send + Sync {
    /// Unique name for this hook (for logging and metrics).
    fn name(&self) -> &str;

    /// Event types this hook handles.
    ///
    /// Return an empty slice to match all event types.
    fn event_types(&self) -> &[AuthorizationEventType] {
        &[] // default: all event types
    }

    /// Handle an event.
    ///
    /// This method should be quick and non-blocking.
    async fn handle(&self, event: &AuthorizationEvent) -> Result<(), HookError>;

    /// Check if this hook should handle the given event.
    fn matches(&self, event: &AuthorizationEvent) -> bool {
        let event_types = self.event_types();
        event_types.is_empty() || event_types.contains(&event.event_type)
    }

    /// Called when the hook system starts.
    async fn on_start(&self) -> Result<(), HookError> {
        Ok(())
    }

    /// Called when the hook system shuts down.
    async fn on_shutdown(&self) -> Result<(), HookError> {
        Ok(())
    }
}
