//! Validator registry: one strategy per resource kind, checked at startup.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::request::RequestContext;
use super::strategies::{
    Capabilities, ClientStrategy, ResourceKind, TokenStrategy, TokenTypeHint, UserStrategy,
    required_operations,
};
use super::types::{Client, ResponseType, StoreError, Token};

/// A strategy was registered without one of its kind's required operations.
///
/// Raised once, at construction; the system must not start on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ResourceKind,
    pub operation: &'static str,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} strategy must implement the `{}` operation",
            self.kind, self.operation
        )
    }
}

impl std::error::Error for ConfigError {}

/// Holds one strategy per resource kind and routes validation calls to it.
///
/// Construction verifies every supplied strategy against its kind's required
/// operations, so a misconfigured deployment surfaces before the first
/// request. Dispatch methods forward verbatim; ordering and interpretation
/// belong to [`AuthorizationEngine`](super::engine::AuthorizationEngine).
#[derive(Clone)]
pub struct ValidatorRegistry {
    users: Option<Arc<dyn UserStrategy>>,
    clients: Arc<dyn ClientStrategy>,
    tokens: Arc<dyn TokenStrategy>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("users", &self.users.is_some())
            .finish_non_exhaustive()
    }
}

impl ValidatorRegistry {
    /// Registers the strategies, failing on the first capability gap. The
    /// user strategy is optional; client and token strategies are not.
    pub fn new(
        users: Option<Arc<dyn UserStrategy>>,
        clients: Arc<dyn ClientStrategy>,
        tokens: Arc<dyn TokenStrategy>,
    ) -> Result<Self, ConfigError> {
        if let Some(users) = &users {
            Self::verify(&users.capabilities())?;
        }
        Self::verify(&clients.capabilities())?;
        Self::verify(&tokens.capabilities())?;
        debug!("validator registry configured");
        Ok(ValidatorRegistry {
            users,
            clients,
            tokens,
        })
    }

    fn verify(capabilities: &Capabilities) -> Result<(), ConfigError> {
        let kind = capabilities.kind();
        for &operation in required_operations(kind) {
            if !capabilities.supports(operation) {
                return Err(ConfigError { kind, operation });
            }
        }
        Ok(())
    }

    /// The registered user strategy, when one was supplied.
    pub fn users(&self) -> Option<&Arc<dyn UserStrategy>> {
        self.users.as_ref()
    }

    pub async fn get_redirect_uri(
        &self,
        client_id: &str,
        ctx: &RequestContext,
    ) -> Result<Option<String>, StoreError> {
        self.clients.get_redirect_uri(client_id, ctx).await
    }

    pub async fn get_scopes(
        &self,
        client_id: &str,
        ctx: &RequestContext,
    ) -> Result<Vec<String>, StoreError> {
        self.clients.get_scopes(client_id, ctx).await
    }

    pub async fn validate_client_id(
        &self,
        client_id: &str,
        ctx: &mut RequestContext,
    ) -> Result<bool, StoreError> {
        self.clients.validate_client_id(client_id, ctx).await
    }

    pub async fn validate_redirect_uri(
        &self,
        client_id: &str,
        redirect_uri: &str,
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        self.clients
            .validate_redirect_uri(client_id, redirect_uri, ctx)
            .await
    }

    pub async fn validate_response_type(
        &self,
        client_id: &str,
        response_type: ResponseType,
        client: Option<&Client>,
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        self.clients
            .validate_response_type(client_id, response_type, client, ctx)
            .await
    }

    pub async fn validate_scopes(
        &self,
        client_id: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        self.clients.validate_scopes(client_id, scopes, ctx).await
    }

    pub async fn save_token(
        &self,
        token: &Token,
        ctx: &RequestContext,
    ) -> Result<String, StoreError> {
        self.tokens.save(token, ctx).await
    }

    pub async fn revoke_token(
        &self,
        token: &str,
        hint: Option<TokenTypeHint>,
        ctx: &RequestContext,
    ) -> Result<(), StoreError> {
        self.tokens.revoke(token, hint, ctx).await
    }

    pub async fn validate_token(
        &self,
        token: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        self.tokens.validate(token, scopes, ctx).await
    }
}
