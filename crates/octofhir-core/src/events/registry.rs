//! Hook registry and dispatcher.
//!
//! The dispatcher drains the event broadcast channel into the registry,
//! which runs each matching hook isolated from the rest.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, warn};

use super::hooks::AuthorizationHook;
use super::types::AuthorizationEvent;

/// Default timeout for hook execution.
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Hook Registry
// ============================================================================

/// Observers of authorization events, with their execution timeout.
pub struct HookRegistry {
    hooks: RwLock<Vec<Arc<dyn AuthorizationHook>>>,
    timeout: Duration,
}

impl HookRegistry {
    /// Create a new empty registry with default timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_HOOK_TIMEOUT)
    }

    /// Registry whose hooks are cancelled after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
            timeout,
        }
    }

    /// Register a hook.
    pub async fn register(&self, hook: Arc<dyn AuthorizationHook>) {
        debug!(hook = %hook.name(), "Registered authorization hook");
        self.hooks.write().await.push(hook);
    }

    /// Get the number of registered hooks.
    pub async fn hook_count(&self) -> usize {
        self.hooks.read().await.len()
    }

    /// Time a hook may spend on one event before it is cancelled.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Hooks subscribed to the event's type.
    pub async fn matching(&self, event: &AuthorizationEvent) -> Vec<Arc<dyn AuthorizationHook>> {
        self.hooks
            .read()
            .await
            .iter()
            .filter(|hook| hook.matches(event))
            .cloned()
            .collect()
    }

    /// Hands the event to every matching hook and returns immediately.
    ///
    /// Each hook runs in its own task. A hook that fails, panics or exceeds
    /// the timeout is logged and has no effect on the others.
    pub async fn dispatch(&self, event: &AuthorizationEvent) {
        let hooks = self.matching(event).await;
        if hooks.is_empty() {
            debug!(event_type = %event.event_type, "No hooks matched event");
            return;
        }

        for hook in hooks {
            tokio::spawn(run_isolated(hook, event.clone(), self.timeout));
        }
    }

    /// Calls `on_start` on every hook. Failures are logged only.
    pub async fn on_start(&self) {
        for hook in self.hooks.read().await.iter() {
            if let Err(e) = hook.on_start().await {
                warn!(hook = %hook.name(), error = %e, "Hook on_start failed");
            }
        }
    }

    /// Calls `on_shutdown` on every hook. Failures are logged only.
    pub async fn on_shutdown(&self) {
        for hook in self.hooks.read().await.iter() {
            if let Err(e) = hook.on_shutdown().await {
                warn!(hook = %hook.name(), error = %e, "Hook on_shutdown failed");
            }
        }
    }
}

async fn run_isolated(hook: Arc<dyn AuthorizationHook>, event: AuthorizationEvent, timeout: Duration) {
    let outcome = tokio::time::timeout(timeout, AssertUnwindSafe(hook.handle(&event)).catch_unwind()).await;

    match outcome {
        Ok(Ok(Ok(()))) => {
            debug!(hook = %hook.name(), client_id = %event.client_id, "Hook handled event");
        }
        Ok(Ok(Err(e))) => {
            warn!(
                hook = %hook.name(),
                client_id = %event.client_id,
                error = %e,
                "Hook failed to handle event"
            );
        }
        Ok(Err(payload)) => {
            error!(
                hook = %hook.name(),
                client_id = %event.client_id,
                panic = %panic_message(payload.as_ref()),
                "Hook panicked"
            );
        }
        Err(_) => {
            error!(
                hook = %hook.name(),
                client_id = %event.client_id,
                timeout_ms = timeout.as_millis() as u64,
                "Hook timed out"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Hook Dispatcher
// ============================================================================

/// Background task feeding broadcast events into a [`HookRegistry`].
pub struct HookDispatcher {
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Create a new dispatcher for the given registry.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Run the dispatcher, processing events from the broadcast channel.
    ///
    /// Forwards events to the registry until every sender is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<AuthorizationEvent>) {
        let hook_count = self.registry.hook_count().await;
        info!(hooks = hook_count, "Starting authorization hook dispatcher");
        self.registry.on_start().await;

        loop {
            match receiver.recv().await {
                Ok(event) => self.registry.dispatch(&event).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Hook dispatcher lagged, authorization events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        info!("Authorization event channel closed, stopping hook dispatcher");
        self.registry.on_shutdown().await;
    }

    /// Get the registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for HookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookDispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles a registry and starts its dispatcher.
pub struct HookSystemBuilder {
    registry: HookRegistry,
}

impl HookSystemBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            registry: HookRegistry::new(),
        }
    }

    /// Create a new builder with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            registry: HookRegistry::with_timeout(timeout),
        }
    }

    /// Register a hook.
    pub async fn register(self, hook: Arc<dyn AuthorizationHook>) -> Self {
        self.registry.register(hook).await;
        self
    }

    /// Build the registry.
    pub fn build(self) -> Arc<HookRegistry> {
        Arc::new(self.registry)
    }

    /// Spawns the dispatcher on `receiver` and returns the registry.
    pub fn start(self, receiver: broadcast::Receiver<AuthorizationEvent>) -> Arc<HookRegistry> {
        let registry = Arc::new(self.registry);
        let dispatcher = HookDispatcher::new(registry.clone());
        tokio::spawn(dispatcher.run(receiver));
        registry
    }
}

impl Default for HookSystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
