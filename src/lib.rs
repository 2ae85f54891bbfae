pub mod auth_core;

pub use auth_core::engine::AuthorizationEngine;
pub use auth_core::guard::{AuthRequirements, RouteGuard};
pub use auth_core::memory::{InMemoryClientDirectory, InMemoryTokenStore, InMemoryUserDirectory};
pub use auth_core::registry::{ConfigError, ValidatorRegistry};
pub use auth_core::request::{AuthRequest, AuthRequestBuilder, RequestContext};
pub use auth_core::strategies::{
    Capabilities, ClientStrategy, ResourceKind, TokenStrategy, TokenTypeHint, UserStrategy,
};
pub use auth_core::tokens::{
    DEFAULT_TOKEN_TTL, RandomTokenGenerator, SignedTokenGenerator, TokenGenerator, TokenLifecycle,
};
pub use auth_core::types::{Client, Decision, ErrorKind, ResponseType, StoreError, Token, User};
