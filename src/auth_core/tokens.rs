//! Token issuance, validation and revocation through the registered strategy.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::registry::ValidatorRegistry;
use super::request::RequestContext;
use super::strategies::TokenTypeHint;
use super::types::{StoreError, Token};

/// Default access token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL: u64 = 3600;

/// Produces unguessable access token strings.
pub trait TokenGenerator: Send + Sync + 'static {
    /// Generates the token string for one grant. `expires_at` is the expiry
    /// already computed by the lifecycle manager; self-contained formats
    /// embed it.
    fn generate(
        &self,
        client_id: &str,
        user_id: Option<&str>,
        scopes: &[String],
        expires_at: DateTime<Utc>,
    ) -> Result<String, StoreError>;
}

/// Opaque tokens from the system CSPRNG, base64url-encoded without padding.
pub struct RandomTokenGenerator {
    rng: SystemRandom,
    bytes: usize,
}

impl RandomTokenGenerator {
    /// 32 bytes of entropy per token.
    pub fn new() -> Self {
        RandomTokenGenerator {
            rng: SystemRandom::new(),
            bytes: 32,
        }
    }

    /// Custom entropy size, for stores with narrow token columns.
    pub fn with_bytes(bytes: usize) -> Self {
        RandomTokenGenerator {
            rng: SystemRandom::new(),
            bytes,
        }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(
        &self,
        _client_id: &str,
        _user_id: Option<&str>,
        _scopes: &[String],
        _expires_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let mut buf = vec![0u8; self.bytes];
        self.rng
            .fill(&mut buf)
            .map_err(|_| StoreError::from("token entropy generation failed"))?;
        Ok(URL_SAFE_NO_PAD.encode(&buf))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SignedClaims {
    sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    exp: usize,
    jti: String,
}

/// Self-contained HS256 tokens. The store still persists and validates the
/// issued record; signing only makes the string verifiable offline.
pub struct SignedTokenGenerator {
    encoding_key: EncodingKey,
}

impl SignedTokenGenerator {
    pub fn hs256(secret: &[u8]) -> Self {
        SignedTokenGenerator {
            encoding_key: EncodingKey::from_secret(secret),
        }
    }
}

impl TokenGenerator for SignedTokenGenerator {
    fn generate(
        &self,
        client_id: &str,
        user_id: Option<&str>,
        scopes: &[String],
        expires_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let claims = SignedClaims {
            sub: client_id.to_string(),
            uid: user_id.map(str::to_string),
            scope: if scopes.is_empty() {
                None
            } else {
                Some(scopes.join(" "))
            },
            exp: expires_at.timestamp() as usize,
            // Distinguishes tokens minted with identical claims.
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| Box::new(e) as StoreError)
    }
}

/// Issues, validates and revokes bearer tokens through the registered token
/// strategy. Holds no mutable state of its own; token-string uniqueness
/// under concurrent issuance is the storage strategy's responsibility.
#[derive(Clone)]
pub struct TokenLifecycle {
    registry: Arc<ValidatorRegistry>,
    generator: Arc<dyn TokenGenerator>,
    ttl_secs: u64,
}

impl TokenLifecycle {
    pub fn new(registry: Arc<ValidatorRegistry>) -> Self {
        TokenLifecycle {
            registry,
            generator: Arc::new(RandomTokenGenerator::new()),
            ttl_secs: DEFAULT_TOKEN_TTL,
        }
    }

    /// Sets the access token lifetime.
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Swaps the token string generator.
    pub fn with_generator(mut self, generator: Arc<dyn TokenGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Generates and persists a bearer token for one grant. A save failure,
    /// duplicate token string included, propagates unretried.
    #[instrument(skip(self, ctx), level = "debug")]
    pub async fn issue(
        &self,
        client_id: &str,
        user_id: Option<&str>,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<Token, StoreError> {
        let expires_at = Utc::now() + Duration::seconds(self.ttl_secs as i64);
        let access_token = self
            .generator
            .generate(client_id, user_id, scopes, expires_at)?;
        let token = Token {
            access_token,
            token_type: "Bearer".to_string(),
            client_id: client_id.to_string(),
            user_id: user_id.map(str::to_string),
            scopes: scopes.to_vec(),
            expires_at,
        };
        let record_id = self.registry.save_token(&token, ctx).await?;
        debug!(client_id, record_id = %record_id, "bearer token issued");
        Ok(token)
    }

    /// True when the token is live and covers every requested scope.
    pub async fn validate(
        &self,
        token: &str,
        scopes: &[String],
        ctx: &RequestContext,
    ) -> Result<bool, StoreError> {
        self.registry.validate_token(token, scopes, ctx).await
    }

    /// Marks a token inactive. Idempotent: unknown and already-revoked
    /// tokens succeed, so callers never learn whether a token existed.
    #[instrument(skip(self, token, ctx), level = "debug")]
    pub async fn revoke(
        &self,
        token: &str,
        hint: Option<TokenTypeHint>,
        ctx: &RequestContext,
    ) -> Result<(), StoreError> {
        self.registry.revoke_token(token, hint, ctx).await
    }
}
