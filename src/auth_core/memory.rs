//! In-memory strategy implementations for demonstrations and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::request::RequestContext;
use super::strategies::{ClientStrategy, TokenStrategy, TokenTypeHint, UserStrategy};
use super::types::{Client, ResponseType, StoreError, Token, User};

/// Client directory backed by a concurrent map.
#[derive(Clone)]
pub struct InMemoryClientDirectory {
    clients: Arc<DashMap<String, Client>>,
}

impl InMemoryClientDirectory {
    /// Creates a directory seeded with `initial_clients`.
    pub fn new(initial_clients: Vec<Client>) -> Self {
        let clients = DashMap::new();
        for client in initial_clients {
            clients.insert(client.id.clone(), client);
        }
        InMemoryClientDirectory {
            clients: Arc::new(clients),
        }
    }

    /// Registers or replaces a client.
    pub fn insert(&self, client: Client) {
        self.clients.insert(client.id.clone(), client);
    }
}

#[async_trait]
impl ClientStrategy for InMemoryClientDirectory {
    async fn get_redirect_uri(
        &self,
        client_id: &str,
        _ctx: &RequestContext,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .clients
            .get(client_id)
            .and_then(|entry| entry.value().default_redirect_uri().map(str::to_string)))
    }

    async fn get_scopes(
        &self,
        client_id: &str,
        _ctx: &RequestContext,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .clients
            .get(client_id)
            .map(|entry| entry.value().scopes.clone())
            .unwrap_or_default())
    }

    async fn validate_client_id(
        &self,
        client_id: &str,
        ctx: &mut RequestContext,
    ) -> Result<bool, StoreError> {
        match self.clients.get(client_id) {
            Some(entry) => {
                ctx.attach_client(entry.value().clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn validate_redirect_uri(
        &self,
        client_id: &str,
        redirect_uri: &str,
        _ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        Ok(self
            .clients
            .get(client_id)
            .map(|entry| entry.value().allows_redirect_uri(redirect_uri))
            .unwrap_or(false))
    }

    async fn validate_response_type(
        &self,
        client_id: &str,
        response_type: ResponseType,
        client: Option<&Client>,
        _ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        if let Some(client) = client {
            return Ok(client.allows_response_type(response_type));
        }
        Ok(self
            .clients
            .get(client_id)
            .map(|entry| entry.value().allows_response_type(response_type))
            .unwrap_or(false))
    }

    async fn validate_scopes(
        &self,
        client_id: &str,
        scopes: &[String],
        _ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        Ok(self
            .clients
            .get(client_id)
            .map(|entry| entry.value().allows_scopes(scopes))
            .unwrap_or(false))
    }
}

/// One persisted token and its revocation flag.
#[derive(Debug, Clone)]
struct StoredToken {
    record_id: String,
    revoked: bool,
    token: Token,
}

/// Token store backed by a concurrent map, keyed by token string. The entry
/// API makes the uniqueness check and the insert one atomic step.
#[derive(Clone)]
pub struct InMemoryTokenStore {
    tokens: Arc<DashMap<String, StoredToken>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        InMemoryTokenStore {
            tokens: Arc::new(DashMap::new()),
        }
    }

    /// Record id a token string was persisted under.
    pub fn record_id(&self, token: &str) -> Option<String> {
        self.tokens
            .get(token)
            .map(|entry| entry.value().record_id.clone())
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStrategy for InMemoryTokenStore {
    async fn save(&self, token: &Token, _ctx: &RequestContext) -> Result<String, StoreError> {
        match self.tokens.entry(token.access_token.clone()) {
            Entry::Occupied(_) => Err("duplicate token string".into()),
            Entry::Vacant(slot) => {
                let record_id = Uuid::new_v4().to_string();
                slot.insert(StoredToken {
                    record_id: record_id.clone(),
                    revoked: false,
                    token: token.clone(),
                });
                Ok(record_id)
            }
        }
    }

    async fn revoke(
        &self,
        token: &str,
        _hint: Option<TokenTypeHint>,
        _ctx: &RequestContext,
    ) -> Result<(), StoreError> {
        if let Some(mut entry) = self.tokens.get_mut(token) {
            entry.revoked = true;
        }
        Ok(())
    }

    async fn validate(
        &self,
        token: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        match self.tokens.get(token) {
            Some(entry) => {
                let stored = entry.value();
                // A context resolved to a client only accepts tokens issued
                // to that client.
                let bound = ctx
                    .client()
                    .map(|client| stored.token.client_id == client.id)
                    .unwrap_or(true);
                Ok(bound
                    && !stored.revoked
                    && !stored.token.is_expired()
                    && stored.token.covers(scopes))
            }
            None => Ok(false),
        }
    }
}

/// User directory. Resource owners are opaque to the decision pipeline, so
/// the strategy surface is just the capability report; the lookup methods
/// serve outer authentication layers.
#[derive(Clone)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserDirectory {
    pub fn new(initial_users: Vec<User>) -> Self {
        let mut users = HashMap::new();
        for user in initial_users {
            users.insert(user.username.clone(), user);
        }
        InMemoryUserDirectory {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub async fn get(&self, username: &str) -> Option<User> {
        self.users.read().await.get(username).cloned()
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.username.clone(), user);
    }
}

impl UserStrategy for InMemoryUserDirectory {}
