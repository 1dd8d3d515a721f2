//! Authorization endpoint configuration.
//!
//! This module provides the configuration types for the authorization
//! response stage: the advertised issuer, multi-tenant issuer resolution,
//! JWT-secured response settings and the lifecycle event bus.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::token::jwt::SigningAlgorithm;

/// Placeholder replaced by the client's tenant in `issuer_template`.
pub const TENANT_PLACEHOLDER: &str = "{tenant}";

/// Root authorization endpoint configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://auth.example.com"
///
/// [auth.tenancy]
/// enabled = true
/// issuer_template = "https://auth.example.com/tenants/{tenant}"
///
/// [auth.response]
/// jwt_lifetime = "2m"
/// signing_algorithm = "RS256"
/// signing_key_id = "jarm-2026"
/// signing_key_path = "/etc/auth/jarm.pem"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (used as the `iss` response parameter).
    /// This should be the public base URL of the authorization server.
    pub issuer: String,

    /// Multi-tenant issuer configuration.
    pub tenancy: TenancyConfig,

    /// Authorization response configuration.
    pub response: ResponseConfig,

    /// Lifecycle event bus configuration.
    pub events: EventsConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            tenancy: TenancyConfig::default(),
            response: ResponseConfig::default(),
            events: EventsConfig::default(),
        }
    }
}

/// Multi-tenant issuer configuration.
///
/// When enabled, each client advertises the issuer of its tenant instead of
/// the server-wide issuer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Resolve issuers per tenant.
    pub enabled: bool,

    /// Issuer template, `{tenant}` is replaced with the client's tenant.
    /// When unset, tenants without an explicit override use the default issuer.
    pub issuer_template: Option<String>,

    /// Explicit issuer per tenant, takes precedence over the template.
    pub issuers: HashMap<String, String>,
}

/// Authorization response configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Lifetime of JWT-secured authorization responses (`*.jwt` modes).
    /// Responses are consumed by the client immediately, keep this short.
    #[serde(with = "humantime_serde")]
    pub jwt_lifetime: Duration,

    /// Algorithm used to sign JWT-secured responses.
    /// Supported: "RS256", "RS384", "ES384"
    pub signing_algorithm: String,

    /// Key ID advertised in the `kid` header and the JWKS.
    /// Defaults to "jarm" for configured keys. Generated keys get a UUID.
    pub signing_key_id: Option<String>,

    /// PEM-encoded private signing key.
    /// RSA: PKCS#8 or PKCS#1. ES384: PKCS#8 or SEC1.
    #[serde(skip_serializing)]
    pub signing_key_pem: Option<String>,

    /// Path to a PEM-encoded private signing key.
    /// Mutually exclusive with `signing_key_pem`. When neither is set, an
    /// ephemeral key is generated at startup.
    pub signing_key_path: Option<PathBuf>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            jwt_lifetime: Duration::from_secs(120),
            signing_algorithm: "RS256".to_string(),
            signing_key_id: None,
            signing_key_pem: None,
            signing_key_path: None,
        }
    }
}

impl ResponseConfig {
    /// Returns the configured signing algorithm.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unsupported algorithm.
    pub fn algorithm(&self) -> Result<SigningAlgorithm, ConfigError> {
        self.signing_algorithm.parse().map_err(|_| {
            ConfigError::InvalidValue(format!(
                "Invalid signing algorithm: '{}'. Must be RS256, RS384, or ES384",
                self.signing_algorithm
            ))
        })
    }

    /// Returns the configured private key PEM, reading it from
    /// `signing_key_path` when needed. `None` means no key is configured.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the key file cannot be read.
    pub fn signing_key_pem(&self) -> Result<Option<String>, ConfigError> {
        if let Some(pem) = &self.signing_key_pem {
            return Ok(Some(pem.clone()));
        }
        match &self.signing_key_path {
            Some(path) => std::fs::read_to_string(path)
                .map(Some)
                .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display()))),
            None => Ok(None),
        }
    }
}

/// Lifecycle event bus configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity. Slow observers lose the oldest events.
    pub buffer_size: usize,

    /// Maximum time a single hook may spend on one event.
    #[serde(with = "humantime_serde")]
    pub hook_timeout: Duration,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            hook_timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration document could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(String),
}

/// Top-level document shape: settings live under `[auth]`.
#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    auth: AuthConfig,
}

impl AuthConfig {
    /// Parses and validates configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and any validation error.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = toml::from_str(toml_str)
            .map_err(|e| ConfigError::Parse(format!("TOML parse error: {e}")))?;
        document.auth.validate()?;
        Ok(document.auth)
    }

    /// Reads, parses and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The issuer is empty or not an absolute URL
    /// - Tenancy is enabled with a template lacking `{tenant}` or a bad override
    /// - The signing algorithm is not supported
    /// - Both `signing_key_pem` and `signing_key_path` are set
    /// - The JWT lifetime, buffer size or hook timeout is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::Missing("issuer".to_string()));
        }
        validate_url("issuer", &self.issuer)?;

        if self.tenancy.enabled {
            if let Some(template) = &self.tenancy.issuer_template {
                if !template.contains(TENANT_PLACEHOLDER) {
                    return Err(ConfigError::InvalidValue(format!(
                        "tenancy.issuer_template must contain '{}'",
                        TENANT_PLACEHOLDER
                    )));
                }
                validate_url(
                    "tenancy.issuer_template",
                    &template.replace(TENANT_PLACEHOLDER, "tenant"),
                )?;
            }

            for (tenant, issuer) in &self.tenancy.issuers {
                validate_url(&format!("tenancy.issuers.{tenant}"), issuer)?;
            }
        }

        self.response.algorithm()?;

        if self.response.signing_key_pem.is_some() && self.response.signing_key_path.is_some() {
            return Err(ConfigError::InvalidValue(
                "response.signing_key_pem and response.signing_key_path are mutually exclusive"
                    .to_string(),
            ));
        }

        if self.response.jwt_lifetime.is_zero() {
            return Err(ConfigError::InvalidValue(
                "response.jwt_lifetime must be > 0".to_string(),
            ));
        }

        if self.events.buffer_size == 0 {
            return Err(ConfigError::InvalidValue(
                "events.buffer_size must be > 0".to_string(),
            ));
        }

        if self.events.hook_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "events.hook_timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidValue(format!("{field} is not an absolute URL: {e}")))
}
