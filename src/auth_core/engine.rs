//! Authorization decision engine: the ordered validation pipeline.

use std::sync::Arc;

use tracing::{debug, instrument};

use super::registry::ValidatorRegistry;
use super::request::{AuthRequest, RequestContext};
use super::strategies::TokenTypeHint;
use super::tokens::{TokenGenerator, TokenLifecycle};
use super::types::{Decision, ErrorKind, ResponseType, StoreError};

/// Orders the validations behind grant and deny decisions.
///
/// Client authentication always runs first, and redirect URI and response
/// type precede scopes: the later checks are scoped to a resolved client and
/// must not run for an invalid one. Any failed step is terminal for the
/// request; the engine never retries or falls through.
pub struct AuthorizationEngine {
    registry: Arc<ValidatorRegistry>,
    lifecycle: TokenLifecycle,
}

impl AuthorizationEngine {
    pub fn new(registry: Arc<ValidatorRegistry>) -> Self {
        let lifecycle = TokenLifecycle::new(registry.clone());
        AuthorizationEngine {
            registry,
            lifecycle,
        }
    }

    /// Sets the lifetime of issued tokens.
    pub fn token_ttl(mut self, ttl_secs: u64) -> Self {
        self.lifecycle = self.lifecycle.with_ttl(ttl_secs);
        self
    }

    /// Swaps the token string generator.
    pub fn token_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.lifecycle = self.lifecycle.with_generator(generator);
        self
    }

    /// The token lifecycle manager backing this engine.
    pub fn lifecycle(&self) -> &TokenLifecycle {
        &self.lifecycle
    }

    /// Resolves and validates the client named by the request. On success
    /// the resolved record is attached to `ctx` for the later steps.
    #[instrument(skip_all, level = "debug")]
    pub async fn authenticate_client(
        &self,
        request: &AuthRequest,
        ctx: &mut RequestContext,
    ) -> Result<bool, StoreError> {
        let Some(client_id) = request.client_id() else {
            debug!("request carries no client id");
            return Ok(false);
        };
        let known = self.registry.validate_client_id(client_id, ctx).await?;
        if !known {
            debug!(client_id, "unknown client");
        }
        Ok(known)
    }

    /// True only when the bearer token is live for the client resolved in
    /// `ctx` and its granted scopes cover every entry in `scopes`.
    pub async fn authorize_token(
        &self,
        token: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        self.lifecycle.validate(token, scopes, ctx).await
    }

    /// Runs the full pipeline for one authorization attempt. Validation
    /// failures come back as deny decisions; only collaborator failures are
    /// `Err`, for the response layer to render as a server error.
    #[instrument(skip_all, level = "debug")]
    pub async fn validate_authorization_request(
        &self,
        request: &AuthRequest,
        ctx: &mut RequestContext,
    ) -> Result<Decision, StoreError> {
        let Some(client_id) = request.client_id() else {
            return Ok(Decision::denied(ErrorKind::InvalidClient));
        };
        if !self.authenticate_client(request, ctx).await? {
            return Ok(Decision::denied(ErrorKind::InvalidClient));
        }

        match request.redirect_uri() {
            Some(redirect_uri) => {
                if !self
                    .registry
                    .validate_redirect_uri(client_id, redirect_uri, ctx)
                    .await?
                {
                    return Ok(Decision::denied(ErrorKind::InvalidRedirectUri));
                }
            }
            // No URI on the request: the client must have a registered default.
            None => {
                if self.registry.get_redirect_uri(client_id, ctx).await?.is_none() {
                    return Ok(Decision::denied(ErrorKind::InvalidRedirectUri));
                }
            }
        }

        // Unknown and missing response types are unsupported; a known type
        // outside the client's permitted set is an authorization failure.
        let response_type = match request.response_type().and_then(ResponseType::parse) {
            Some(response_type) => response_type,
            None => return Ok(Decision::denied(ErrorKind::UnsupportedResponseType)),
        };
        if !self
            .registry
            .validate_response_type(client_id, response_type, ctx.client(), ctx)
            .await?
        {
            return Ok(Decision::denied(ErrorKind::UnauthorizedClient));
        }

        // An empty scope list falls back to the client's registered defaults.
        let scopes = if request.scopes().is_empty() {
            self.registry.get_scopes(client_id, ctx).await?
        } else {
            request.scopes().to_vec()
        };
        if !self.registry.validate_scopes(client_id, &scopes, ctx).await? {
            return Ok(Decision::denied(ErrorKind::InvalidScope));
        }

        match response_type {
            ResponseType::Token => {
                let user_id = ctx.user().map(|user| user.username.clone());
                let token = self
                    .lifecycle
                    .issue(client_id, user_id.as_deref(), &scopes, ctx)
                    .await?;
                Ok(Decision::granted_with_token(client_id, token))
            }
            // Code minting belongs to the flow layer above; the decision is
            // what callers consume here.
            ResponseType::Code => Ok(Decision::granted_for(client_id)),
        }
    }

    /// Resolves the client, then revokes the presented token. A request
    /// whose client cannot be authenticated still reports success with
    /// nothing revoked: revocation responses must not reveal whether a
    /// token exists.
    #[instrument(skip_all, level = "debug")]
    pub async fn validate_revocation_request(
        &self,
        request: &AuthRequest,
        ctx: &mut RequestContext,
    ) -> Result<Decision, StoreError> {
        if !self.authenticate_client(request, ctx).await? {
            debug!("revocation for unauthenticated client ignored");
            return Ok(Decision::granted());
        }
        if let Some(token) = request.bearer_token() {
            self.lifecycle
                .revoke(token, Some(TokenTypeHint::AccessToken), ctx)
                .await?;
        }
        match request.client_id() {
            Some(client_id) => Ok(Decision::granted_for(client_id)),
            None => Ok(Decision::granted()),
        }
    }
}
