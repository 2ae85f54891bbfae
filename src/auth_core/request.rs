//! Inbound request view and the per-request context threaded through calls.

use super::types::{Client, User};

/// Derived view of one inbound protocol request. Immutable once built, so a
/// decision is reproducible from the request alone.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    client_id: Option<String>,
    scopes: Vec<String>,
    redirect_uri: Option<String>,
    response_type: Option<String>,
    state: Option<String>,
    bearer_token: Option<String>,
}

impl AuthRequest {
    pub fn builder() -> AuthRequestBuilder {
        AuthRequestBuilder::default()
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    /// Requested scopes; order is not significant.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn redirect_uri(&self) -> Option<&str> {
        self.redirect_uri.as_deref()
    }

    /// Raw response type as received on the wire.
    pub fn response_type(&self) -> Option<&str> {
        self.response_type.as_deref()
    }

    /// Opaque state echoed back by response layers.
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// Bearer token with the `Bearer ` scheme prefix already stripped.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }
}

/// Builder for [`AuthRequest`].
#[derive(Debug, Default)]
pub struct AuthRequestBuilder {
    request: AuthRequest,
}

impl AuthRequestBuilder {
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.request.client_id = Some(client_id.into());
        self
    }

    /// Adds one requested scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.request.scopes.push(scope.into());
        self
    }

    /// Replaces the requested scopes.
    pub fn scopes(mut self, scopes: impl IntoIterator<Item = String>) -> Self {
        self.request.scopes = scopes.into_iter().collect();
        self
    }

    /// Parses the space-separated wire form of the `scope` parameter.
    pub fn scope_str(mut self, raw: &str) -> Self {
        self.request.scopes = raw.split_whitespace().map(str::to_string).collect();
        self
    }

    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.request.redirect_uri = Some(uri.into());
        self
    }

    pub fn response_type(mut self, response_type: impl Into<String>) -> Self {
        self.request.response_type = Some(response_type.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.request.state = Some(state.into());
        self
    }

    /// Bearer token, pre-stripped of its scheme prefix by the request parser.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.request.bearer_token = Some(token.into());
        self
    }

    pub fn build(self) -> AuthRequest {
        self.request
    }
}

/// Mutable request-scoped state passed explicitly through every validation
/// call. Strategies attach resolved records here rather than stashing them on
/// ambient framework state, so concurrent requests stay isolated.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    client: Option<Client>,
    user: Option<User>,
}

impl RequestContext {
    pub fn new() -> Self {
        RequestContext::default()
    }

    /// Context for a request whose resource owner was already authenticated
    /// by an outer layer.
    pub fn for_user(user: User) -> Self {
        RequestContext {
            client: None,
            user: Some(user),
        }
    }

    /// Records the client resolved during authentication.
    pub fn attach_client(&mut self, client: Client) {
        self.client = Some(client);
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
}
