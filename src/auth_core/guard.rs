//! Route protection: declarative requirements checked before a handler runs.

use std::sync::Arc;

use tracing::instrument;

use super::engine::AuthorizationEngine;
use super::request::{AuthRequest, RequestContext};
use super::types::{Decision, ErrorKind, StoreError};

/// What a protected route demands from a request.
#[derive(Debug, Clone, Default)]
pub struct AuthRequirements {
    client_auth: bool,
    token_auth: bool,
    required_scopes: Vec<String>,
}

impl AuthRequirements {
    pub fn new() -> Self {
        AuthRequirements::default()
    }

    /// Require the request to name a valid client.
    pub fn client_auth(mut self, required: bool) -> Self {
        self.client_auth = required;
        self
    }

    /// Require a live bearer token.
    pub fn token_auth(mut self, required: bool) -> Self {
        self.token_auth = required;
        self
    }

    /// Adds one scope the bearer token must cover.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scopes.push(scope.into());
        self
    }

    /// Replaces the scopes the bearer token must cover.
    pub fn scopes(mut self, scopes: impl IntoIterator<Item = String>) -> Self {
        self.required_scopes = scopes.into_iter().collect();
        self
    }

    pub fn required_scopes(&self) -> &[String] {
        &self.required_scopes
    }
}

/// Interceptor a routing layer runs before the handler it protects.
///
/// The routing layer passes the request and context in and acts on the
/// returned decision; nothing is stashed on ambient state.
pub struct RouteGuard {
    engine: Arc<AuthorizationEngine>,
    requirements: AuthRequirements,
}

impl RouteGuard {
    pub fn new(engine: Arc<AuthorizationEngine>, requirements: AuthRequirements) -> Self {
        RouteGuard {
            engine,
            requirements,
        }
    }

    /// Evaluates the configured requirements in order: client first, then
    /// the bearer token with its required scopes. The first failure decides.
    #[instrument(skip_all, level = "debug")]
    pub async fn check(
        &self,
        request: &AuthRequest,
        ctx: &mut RequestContext,
    ) -> Result<Decision, StoreError> {
        if self.requirements.client_auth && !self.engine.authenticate_client(request, ctx).await? {
            return Ok(Decision::denied(ErrorKind::InvalidClient));
        }
        if self.requirements.token_auth {
            let Some(token) = request.bearer_token() else {
                return Ok(Decision::denied(ErrorKind::InvalidToken));
            };
            if !self
                .engine
                .authorize_token(token, &self.requirements.required_scopes, ctx)
                .await?
            {
                return Ok(Decision::denied(ErrorKind::InvalidToken));
            }
        }
        match ctx.client() {
            Some(client) => Ok(Decision::granted_for(client.id.clone())),
            None => Ok(Decision::granted()),
        }
    }
}
