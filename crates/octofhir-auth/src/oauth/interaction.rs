//! User interactions.
//!
//! An interaction is created when the authorization endpoint hands the
//! user-agent off to an out-of-band step (login, consent). When the flow
//! resumes, the pushed request that started it is no longer attached to the
//! request context and is reached through the interaction instead.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// A user interaction between authorization request and response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Interaction identifier.
    pub uid: String,

    /// Client the interaction belongs to.
    pub client_id: String,

    /// Reference of the pushed request that started the flow, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_jti: Option<String>,

    /// Timestamp when the interaction started.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp when the interaction expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Interaction {
    /// Starts a new interaction.
    #[must_use]
    pub fn new(client_id: impl Into<String>, lifetime: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            uid: uuid::Uuid::new_v4().to_string(),
            client_id: client_id.into(),
            par_jti: None,
            created_at: now,
            expires_at: now + lifetime,
        }
    }

    /// Records the pushed request the flow originated from.
    #[must_use]
    pub fn with_par_jti(mut self, jti: impl Into<String>) -> Self {
        self.par_jti = Some(jti.into());
        self
    }

    /// Returns `true` if the interaction has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_interaction() {
        let interaction = Interaction::new("my-app", Duration::minutes(10));
        assert_eq!(interaction.client_id, "my-app");
        assert!(interaction.par_jti.is_none());
        assert!(!interaction.is_expired());
    }

    #[test]
    fn test_with_par_jti() {
        let interaction = Interaction::new("my-app", Duration::minutes(10)).with_par_jti("par-1");
        assert_eq!(interaction.par_jti.as_deref(), Some("par-1"));

        let json = serde_json::to_value(&interaction).unwrap();
        assert_eq!(json["parJti"], "par-1");
    }
}
