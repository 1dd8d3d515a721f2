//! Authorization response dispatch.
//!
//! The last stage of the authorization endpoint. It takes the response
//! produced upstream and delivers it to the client, enforcing single use of
//! the pushed authorization request the flow started with.
//!
//! # Flow
//!
//! 1. Locate the pushed request (attached, or through the interaction)
//! 2. Reject it if it was already consumed
//! 3. Consume it
//! 4. Run the upstream processor to get the response parameters
//! 5. Echo `state`, inject `iss`
//! 6. Publish `authorization.success`
//! 7. Deliver using the response mode
//!
//! Errors from steps 4 and 7 propagate unchanged. Any error means nothing
//! is delivered. Client-facing errors can then be sent back to the client
//! through the same response mode with
//! [`AuthorizationResponder::deliver_error`].

use std::sync::Arc;

use async_trait::async_trait;
use octofhir_core::events::{AuthorizationEvent, EventBroadcaster, HookSystemBuilder};
use tracing::{debug, info, warn};

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationContext;
use crate::oauth::delivery::{Delivery, ResponseModes};
use crate::oauth::issuer::{IssuerPurpose, IssuerResolver, issuer_resolver_from_config};
use crate::oauth::jarm::ResponseSigner;
use crate::oauth::par::{PushedAuthorizationRequest, REQUEST_URI_REJECTED};
use crate::oauth::params::ResponseParameters;
use crate::oauth::shaper::shape_response;
use crate::storage::par::{FindOptions, PushedAuthorizationRequestStorage};

/// Produces the raw authorization response parameters.
///
/// Implemented by the upstream stage (code and token minting, error
/// responses). Its errors are passed through unchanged.
#[async_trait]
pub trait AuthorizationProcessor: Send + Sync {
    /// Returns the response parameters for the request.
    async fn process(&self, ctx: &AuthorizationContext) -> AuthResult<ResponseParameters>;
}

/// Finds the pushed request a flow started with.
#[derive(Clone)]
pub struct ParLocator {
    storage: Arc<dyn PushedAuthorizationRequestStorage>,
}

impl ParLocator {
    /// Creates a locator backed by the given storage.
    pub fn new(storage: Arc<dyn PushedAuthorizationRequestStorage>) -> Self {
        Self { storage }
    }

    /// Returns the record attached to the request, or else the one the
    /// interaction refers to. Expired records are still returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lookup fails.
    pub async fn locate(
        &self,
        ctx: &AuthorizationContext,
    ) -> AuthResult<Option<PushedAuthorizationRequest>> {
        if let Some(par) = &ctx.par {
            return Ok(Some(par.clone()));
        }

        let Some(jti) = ctx
            .interaction
            .as_ref()
            .and_then(|interaction| interaction.par_jti.as_deref())
        else {
            return Ok(None);
        };

        let par = self
            .storage
            .find_by_jti(jti, FindOptions::ignoring_expiration())
            .await?;
        if par.is_none() {
            debug!(jti = %jti, "Interaction refers to an unknown pushed request");
        }
        Ok(par)
    }
}

impl std::fmt::Debug for ParLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParLocator").finish_non_exhaustive()
    }
}

/// Finalizes and delivers authorization responses.
#[derive(Clone)]
pub struct AuthorizationResponder {
    storage: Arc<dyn PushedAuthorizationRequestStorage>,
    locator: ParLocator,
    issuer: Arc<dyn IssuerResolver>,
    events: EventBroadcaster,
    modes: ResponseModes,
}

impl AuthorizationResponder {
    /// Creates a responder with its own event broadcaster.
    pub fn new(
        storage: Arc<dyn PushedAuthorizationRequestStorage>,
        issuer: Arc<dyn IssuerResolver>,
        modes: ResponseModes,
    ) -> Self {
        Self {
            locator: ParLocator::new(storage.clone()),
            storage,
            issuer,
            events: EventBroadcaster::new(),
            modes,
        }
    }

    /// Builds a responder from configuration.
    ///
    /// Loads the configured response signing key, or generates one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configuration is invalid.
    pub fn from_config(
        config: &AuthConfig,
        storage: Arc<dyn PushedAuthorizationRequestStorage>,
    ) -> AuthResult<Self> {
        config
            .validate()
            .map_err(|e| AuthError::configuration(e.to_string()))?;

        let signer = ResponseSigner::from_config(&config.response)?;
        let modes = ResponseModes::new().with_signer(Arc::new(signer));

        Ok(Self::new(storage, issuer_resolver_from_config(config), modes)
            .with_broadcaster(EventBroadcaster::with_capacity(config.events.buffer_size)))
    }

    /// Returns a hook system builder using the configured hook timeout.
    ///
    /// Start it with a receiver from [`Self::broadcaster`].
    #[must_use]
    pub fn hooks(config: &AuthConfig) -> HookSystemBuilder {
        HookSystemBuilder::with_timeout(config.events.hook_timeout)
    }

    /// Publishes lifecycle events on the given broadcaster.
    #[must_use]
    pub fn with_broadcaster(mut self, events: EventBroadcaster) -> Self {
        self.events = events;
        self
    }

    /// Returns the lifecycle event broadcaster.
    pub fn broadcaster(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Returns the delivery strategies.
    pub fn modes(&self) -> &ResponseModes {
        &self.modes
    }

    /// Produces and delivers the authorization response for the request.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRequestUri` if the pushed request was already used
    /// - storage errors while consuming the pushed request
    /// - any error of `processor` or of the delivery, unchanged
    pub async fn respond(
        &self,
        ctx: &AuthorizationContext,
        processor: &dyn AuthorizationProcessor,
    ) -> AuthResult<Delivery> {
        let client_id = ctx.client.client_id.as_str();
        let par = self.locator.locate(ctx).await?;

        if let Some(par) = &par {
            if par.is_consumed() {
                warn!(
                    client_id = %client_id,
                    jti = %par.jti,
                    "Pushed authorization request reused"
                );
                return Err(AuthError::invalid_request_uri(REQUEST_URI_REJECTED));
            }

            // Must be durable before anything is delivered.
            self.storage.consume(&par.jti).await.inspect_err(|e| {
                warn!(
                    client_id = %client_id,
                    jti = %par.jti,
                    error = %e,
                    "Failed to consume pushed authorization request"
                );
            })?;
            debug!(client_id = %client_id, jti = %par.jti, "Consumed pushed authorization request");
        }

        let mut params = processor.process(ctx).await?;

        let issuer = self.issuer.resolve(&ctx.client, IssuerPurpose::Respond);
        shape_response(&mut params, ctx.params.state(), ctx.response_mode, &issuer);
        debug!(
            client_id = %client_id,
            response_mode = %ctx.response_mode,
            parameters = ?params.names().collect::<Vec<_>>(),
            "Shaped authorization response"
        );

        let mut event = AuthorizationEvent::success(
            client_id,
            ctx.response_mode.as_str(),
            ctx.redirect_uri(),
            issuer.as_str(),
            params.clone().into_inner(),
        );
        if let Some(par) = &par {
            event = event.with_par_jti(par.jti.as_str());
        }
        let receivers = self.events.send(event);
        debug!(receivers, "Published authorization.success");

        let delivery_issuer = if ctx.response_mode.is_jwt() {
            self.issuer.resolve(&ctx.client, IssuerPurpose::JwtResponse)
        } else {
            issuer
        };
        let delivery = self
            .modes
            .deliver(ctx, &delivery_issuer, ctx.redirect_uri(), params)?;

        info!(
            client_id = %client_id,
            response_mode = %ctx.response_mode,
            "Delivered authorization response"
        );
        Ok(delivery)
    }

    /// Delivers an OAuth 2.0 error response to the client's redirect target.
    ///
    /// The error gets `state` and `iss` like a successful response and uses
    /// the request's response mode. No event is published and no pushed
    /// request is touched.
    ///
    /// # Errors
    ///
    /// Fails like [`ResponseModes::deliver`] when the redirect target or the
    /// response mode cannot be used. The caller should then answer the
    /// user-agent directly.
    pub fn deliver_error(
        &self,
        ctx: &AuthorizationContext,
        error: &AuthError,
    ) -> AuthResult<Delivery> {
        let mut params = ResponseParameters::new()
            .with("error", error.oauth_error_code())
            .with("error_description", error.description());

        let issuer = self.issuer.resolve(&ctx.client, IssuerPurpose::Respond);
        shape_response(&mut params, ctx.params.state(), ctx.response_mode, &issuer);

        let delivery_issuer = if ctx.response_mode.is_jwt() {
            self.issuer.resolve(&ctx.client, IssuerPurpose::JwtResponse)
        } else {
            issuer
        };
        let delivery = self
            .modes
            .deliver(ctx, &delivery_issuer, ctx.redirect_uri(), params)?;

        debug!(
            client_id = %ctx.client.client_id,
            error = error.oauth_error_code(),
            response_mode = %ctx.response_mode,
            "Delivered authorization error response"
        );
        Ok(delivery)
    }
}

impl std::fmt::Debug for AuthorizationResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationResponder")
            .field("modes", &self.modes)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
