//! Issuer resolution.
//!
//! Decides which issuer identifier is advertised to a client. Single-tenant
//! deployments always advertise the configured issuer; multi-tenant
//! deployments resolve it from the client's tenant.

use std::fmt;
use std::sync::Arc;

use crate::config::{AuthConfig, TENANT_PLACEHOLDER, TenancyConfig};
use crate::types::Client;

/// Call site asking for an issuer.
///
/// Passed to tenant strategies so they can vary by call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssuerPurpose {
    /// The `iss` parameter of an authorization response.
    Respond,
    /// The `iss` claim of a JWT-secured authorization response.
    JwtResponse,
    /// Discovery metadata.
    Discovery,
}

impl IssuerPurpose {
    /// Returns the purpose tag.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Respond => "respond",
            Self::JwtResponse => "jwt_response",
            Self::Discovery => "discovery",
        }
    }
}

impl fmt::Display for IssuerPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolves the issuer advertised to a client.
///
/// Implementations must be deterministic for a given client and purpose.
pub trait IssuerResolver: Send + Sync {
    /// Returns the issuer identifier for the client.
    fn resolve(&self, client: &Client, purpose: IssuerPurpose) -> String;
}

/// Single-tenant resolver returning one fixed issuer.
#[derive(Debug, Clone)]
pub struct StaticIssuer {
    issuer: String,
}

impl StaticIssuer {
    /// Creates a resolver for the given issuer.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
        }
    }
}

impl IssuerResolver for StaticIssuer {
    fn resolve(&self, _client: &Client, _purpose: IssuerPurpose) -> String {
        self.issuer.clone()
    }
}

type IssuerStrategy = dyn Fn(&Client, IssuerPurpose) -> String + Send + Sync;

/// Multi-tenant resolver delegating to a strategy function.
#[derive(Clone)]
pub struct TenantIssuer {
    strategy: Arc<IssuerStrategy>,
}

impl TenantIssuer {
    /// Creates a resolver backed by the given strategy.
    pub fn new<F>(strategy: F) -> Self
    where
        F: Fn(&Client, IssuerPurpose) -> String + Send + Sync + 'static,
    {
        Self {
            strategy: Arc::new(strategy),
        }
    }

    /// Creates the configured strategy.
    ///
    /// Resolution order for a client with a tenant: explicit override from
    /// `tenancy.issuers`, then `issuer_template` with `{tenant}` replaced.
    /// Clients without a tenant, or tenants no rule covers, get
    /// `default_issuer`.
    #[must_use]
    pub fn from_config(tenancy: &TenancyConfig, default_issuer: impl Into<String>) -> Self {
        let overrides = tenancy.issuers.clone();
        let template = tenancy.issuer_template.clone();
        let default_issuer = default_issuer.into();

        Self::new(move |client, _purpose| {
            let Some(tenant) = client.tenant.as_deref() else {
                return default_issuer.clone();
            };

            if let Some(issuer) = overrides.get(tenant) {
                return issuer.clone();
            }

            match &template {
                Some(template) => template.replace(TENANT_PLACEHOLDER, tenant),
                None => default_issuer.clone(),
            }
        })
    }
}

impl IssuerResolver for TenantIssuer {
    fn resolve(&self, client: &Client, purpose: IssuerPurpose) -> String {
        (self.strategy)(client, purpose)
    }
}

impl fmt::Debug for TenantIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantIssuer").finish_non_exhaustive()
    }
}

/// Builds the resolver matching the configuration.
#[must_use]
pub fn issuer_resolver_from_config(config: &AuthConfig) -> Arc<dyn IssuerResolver> {
    if config.tenancy.enabled {
        Arc::new(TenantIssuer::from_config(&config.tenancy, &config.issuer))
    } else {
        Arc::new(StaticIssuer::new(&config.issuer))
    }
}
