//! Authorization audit logging.
//!
//! [`AuthorizationAuditHook`] observes `authorization.success` events and
//! records who received which kind of response. Response values (codes,
//! tokens) are never recorded, only parameter names.

use async_trait::async_trait;
use octofhir_core::events::{
    AuthorizationEvent, AuthorizationEventType, AuthorizationHook, HookError,
};
use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tracing::info;

/// Audit entry for a delivered authorization response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    /// Client the response was delivered to.
    pub client_id: String,
    /// Response mode used.
    pub response_mode: String,
    /// Issuer advertised to the client.
    pub issuer: String,
    /// Consumed pushed authorization request, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub par_jti: Option<String>,
    /// Names of the delivered parameters.
    pub parameters: Vec<String>,
    /// When the response was produced.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<&AuthorizationEvent> for AuditRecord {
    fn from(event: &AuthorizationEvent) -> Self {
        Self {
            client_id: event.client_id.clone(),
            response_mode: event.response_mode.clone(),
            issuer: event.issuer.clone(),
            par_jti: event.par_jti.clone(),
            parameters: event
                .parameter_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            timestamp: event.timestamp,
        }
    }
}

/// Hook writing an audit trail of authorization responses.
///
/// Every event is logged under the `octofhir_auth::audit` target. When a
/// sink is attached, records are also forwarded to it without waiting.
///
/// # Example
///
/// ```ignore
/// let (tx, rx) = tokio::sync::mpsc::channel(1024);
/// let hook = AuthorizationAuditHook::new().with_sink(tx);
/// registry.register(Arc::new(hook)).await;
/// ```
#[derive(Debug, Default)]
pub struct AuthorizationAuditHook {
    sink: Option<mpsc::Sender<AuditRecord>>,
}

impl AuthorizationAuditHook {
    /// Create a hook that only logs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward records to the given channel.
    pub fn with_sink(mut self, sink: mpsc::Sender<AuditRecord>) -> Self {
        self.sink = Some(sink);
        self
    }
}

#[async_trait]
impl AuthorizationHook for AuthorizationAuditHook {
    fn name(&self) -> &str {
        "authorization_audit"
    }

    fn event_types(&self) -> &[AuthorizationEventType] {
        &[AuthorizationEventType::Success]
    }

    async fn handle(&self, event: &AuthorizationEvent) -> Result<(), HookError> {
        let record = AuditRecord::from(event);

        info!(
            target: "octofhir_auth::audit",
            event_type = %event.event_type,
            client_id = %record.client_id,
            response_mode = %record.response_mode,
            issuer = %record.issuer,
            par_jti = ?record.par_jti,
            parameters = ?record.parameters,
            "Authorization response delivered"
        );

        if let Some(sink) = &self.sink {
            sink.try_send(record)
                .map_err(|e| HookError::channel(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn event() -> AuthorizationEvent {
        let mut params = IndexMap::new();
        params.insert("code".to_string(), "secret-code".to_string());
        params.insert("state".to_string(), "abc123".to_string());
        AuthorizationEvent::success(
            "my-app",
            "query",
            "https://app.example.com/cb",
            "https://auth.example.com",
            params,
        )
        .with_par_jti("par-1")
    }

    #[test]
    fn test_record_keeps_names_only() {
        let record = AuditRecord::from(&event());
        assert_eq!(record.parameters, vec!["code", "state"]);
        assert_eq!(record.par_jti.as_deref(), Some("par-1"));

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("secret-code"));
    }

    #[test]
    fn test_hook_matches_success() {
        let hook = AuthorizationAuditHook::new();
        assert!(hook.matches(&event()));
    }

    #[tokio::test]
    async fn test_handle_forwards_to_sink() {
        let (tx, mut rx) = mpsc::channel(4);
        let hook = AuthorizationAuditHook::new().with_sink(tx);

        hook.handle(&event()).await.unwrap();

        let record = rx.recv().await.unwrap();
        assert_eq!(record.client_id, "my-app");
        assert_eq!(record.issuer, "https://auth.example.com");
    }

    #[tokio::test]
    async fn test_handle_full_sink_is_an_error() {
        let (tx, _rx) = mpsc::channel(1);
        let hook = AuthorizationAuditHook::new().with_sink(tx);

        hook.handle(&event()).await.unwrap();
        let err = hook.handle(&event()).await.unwrap_err();
        assert!(matches!(err, HookError::Channel(_)));
    }

    #[tokio::test]
    async fn test_handle_without_sink() {
        assert!(AuthorizationAuditHook::new().handle(&event()).await.is_ok());
    }
}
