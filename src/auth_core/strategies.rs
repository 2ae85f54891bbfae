//! Strategy traits for the three validated resource kinds.
//!
//! Each kind carries a fixed set of required operations. The trait signatures
//! already force complete implementations at compile time; the
//! [`Capabilities`] report exists for backends that cannot honour an
//! operation at runtime (partial adapters over remote directories), so the
//! registry can refuse to start instead of failing mid-request.

use std::collections::{HashMap, HashSet};
use std::fmt;

use async_trait::async_trait;
use lazy_static::lazy_static;

use super::request::RequestContext;
use super::types::{Client, ResponseType, StoreError, Token};

/// Resource kinds a strategy can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Client,
    Token,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Client => "client",
            ResourceKind::Token => "token",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    static ref REQUIRED_OPERATIONS: HashMap<ResourceKind, &'static [&'static str]> = {
        let mut ops: HashMap<ResourceKind, &'static [&'static str]> = HashMap::new();
        ops.insert(ResourceKind::User, &[]);
        ops.insert(
            ResourceKind::Client,
            &[
                "get_redirect_uri",
                "get_scopes",
                "validate_client_id",
                "validate_redirect_uri",
                "validate_response_type",
                "validate_scopes",
            ],
        );
        ops.insert(ResourceKind::Token, &["save", "revoke", "validate"]);
        ops
    };
}

/// Operations a strategy must support for `kind`.
pub fn required_operations(kind: ResourceKind) -> &'static [&'static str] {
    REQUIRED_OPERATIONS.get(&kind).copied().unwrap_or(&[])
}

/// The operations a strategy implementation declares it supports.
///
/// Every trait defaults to the full required set for its kind, so a complete
/// implementation needs no override.
#[derive(Debug, Clone)]
pub struct Capabilities {
    kind: ResourceKind,
    operations: HashSet<&'static str>,
}

impl Capabilities {
    /// Every required operation for `kind`.
    pub fn full(kind: ResourceKind) -> Self {
        Capabilities {
            kind,
            operations: required_operations(kind).iter().copied().collect(),
        }
    }

    /// No operations; extend with [`with`](Self::with).
    pub fn none(kind: ResourceKind) -> Self {
        Capabilities {
            kind,
            operations: HashSet::new(),
        }
    }

    pub fn with(mut self, operation: &'static str) -> Self {
        self.operations.insert(operation);
        self
    }

    pub fn without(mut self, operation: &'static str) -> Self {
        self.operations.remove(operation);
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn supports(&self, operation: &str) -> bool {
        self.operations.contains(operation)
    }
}

/// Revocation hint per RFC 7009.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenTypeHint {
    AccessToken,
    RefreshToken,
}

impl TokenTypeHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenTypeHint::AccessToken => "access_token",
            TokenTypeHint::RefreshToken => "refresh_token",
        }
    }
}

/// Resource-owner strategy. No operations are required of it today; the kind
/// is registered for symmetry and later extension.
pub trait UserStrategy: Send + Sync + 'static {
    /// Operations this implementation supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::full(ResourceKind::User)
    }
}

/// Client strategy: resolution and validation of registered applications.
#[async_trait]
pub trait ClientStrategy: Send + Sync + 'static {
    /// Operations this implementation supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::full(ResourceKind::Client)
    }

    /// Default redirect URI registered for the client.
    async fn get_redirect_uri(
        &self,
        client_id: &str,
        ctx: &RequestContext,
    ) -> Result<Option<String>, StoreError>;

    /// Default scopes granted when a request names none.
    async fn get_scopes(
        &self,
        client_id: &str,
        ctx: &RequestContext,
    ) -> Result<Vec<String>, StoreError>;

    /// True when `client_id` names a registered, active client.
    /// Implementations attach the resolved record with
    /// [`RequestContext::attach_client`] so later steps can read it.
    async fn validate_client_id(
        &self,
        client_id: &str,
        ctx: &mut RequestContext,
    ) -> Result<bool, StoreError>;

    /// True when the client may receive responses at `redirect_uri`.
    async fn validate_redirect_uri(
        &self,
        client_id: &str,
        redirect_uri: &str,
        ctx: &RequestContext,
    ) -> Result<bool, StoreError>;

    /// True when the client may use `response_type`. `client` carries the
    /// record resolved during authentication, when one is available.
    async fn validate_response_type(
        &self,
        client_id: &str,
        response_type: ResponseType,
        client: Option<&Client>,
        ctx: &RequestContext,
    ) -> Result<bool, StoreError>;

    /// True when every scope in `scopes` may be granted to the client.
    async fn validate_scopes(
        &self,
        client_id: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError>;
}

/// Token strategy: persistence, revocation and validation of issued tokens.
#[async_trait]
pub trait TokenStrategy: Send + Sync + 'static {
    /// Operations this implementation supports.
    fn capabilities(&self) -> Capabilities {
        Capabilities::full(ResourceKind::Token)
    }

    /// Persists an issued token and returns the store's record id. Stores
    /// enforce token-string uniqueness here; a duplicate is an error.
    async fn save(&self, token: &Token, ctx: &RequestContext) -> Result<String, StoreError>;

    /// Invalidates a token. Revoking an unknown or already-revoked token is a
    /// no-op success, never an error.
    async fn revoke(
        &self,
        token: &str,
        hint: Option<TokenTypeHint>,
        ctx: &RequestContext,
    ) -> Result<(), StoreError>;

    /// True when the token exists, is neither expired nor revoked, and its
    /// granted scopes cover every entry in `scopes`. When `ctx` carries a
    /// resolved client, the token must have been issued to that client.
    async fn validate(
        &self,
        token: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError>;
}
