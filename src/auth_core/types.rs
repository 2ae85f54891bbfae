//! Core data model: clients, users, tokens, decisions and protocol errors.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

/// Response types in the fixed enumeration understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Authorization code flow.
    Code,
    /// Implicit flow; a bearer token is issued directly.
    Token,
}

impl ResponseType {
    /// Parses the wire form, `None` for anything outside the fixed set.
    pub fn parse(raw: &str) -> Option<ResponseType> {
        match raw {
            "code" => Some(ResponseType::Code),
            "token" => Some(ResponseType::Token),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Code => "code",
            ResponseType::Token => "token",
        }
    }
}

/// A registered OAuth2 client application. Read-only to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Client identifier.
    pub id: String,
    /// Registered redirect URIs; the first entry is the default.
    pub redirect_uris: Vec<String>,
    /// Scopes the client may be granted.
    pub scopes: Vec<String>,
    /// Response types the client may request.
    pub response_types: Vec<ResponseType>,
}

impl Client {
    /// True when `uri` exactly matches, or extends, a registered redirect URI.
    pub fn allows_redirect_uri(&self, uri: &str) -> bool {
        self.redirect_uris
            .iter()
            .any(|allowed| uri.starts_with(allowed.as_str()))
    }

    /// Default redirect URI, if any are registered.
    pub fn default_redirect_uri(&self) -> Option<&str> {
        self.redirect_uris.first().map(String::as_str)
    }

    /// True when every requested scope is among the client's allowed scopes.
    pub fn allows_scopes(&self, requested: &[String]) -> bool {
        requested.iter().all(|scope| self.scopes.contains(scope))
    }

    pub fn allows_response_type(&self, response_type: ResponseType) -> bool {
        self.response_types.contains(&response_type)
    }
}

/// A resource owner. The decision pipeline never inspects it beyond passing
/// its identifier along at issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    /// Free-form attributes the core never reads.
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

/// An issued bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// The opaque (or signed) access token string.
    pub access_token: String,
    /// Always `Bearer` for tokens issued by this crate.
    pub token_type: String,
    /// Client the token was issued to.
    pub client_id: String,
    /// Resource owner the token was issued for, when one was resolved.
    pub user_id: Option<String>,
    /// Scopes granted at issuance.
    pub scopes: Vec<String>,
    /// Absolute expiry time.
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Builds a bearer token expiring `ttl_secs` from now.
    pub fn bearer(
        access_token: impl Into<String>,
        client_id: impl Into<String>,
        user_id: Option<String>,
        scopes: Vec<String>,
        ttl_secs: u64,
    ) -> Self {
        Token {
            access_token: access_token.into(),
            token_type: "Bearer".to_string(),
            client_id: client_id.into(),
            user_id,
            scopes,
            expires_at: Utc::now() + Duration::seconds(ttl_secs as i64),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Remaining lifetime in whole seconds, zero once expired.
    pub fn expires_in(&self) -> u64 {
        let remaining = (self.expires_at - Utc::now()).num_seconds();
        if remaining > 0 { remaining as u64 } else { 0 }
    }

    /// True when the granted scopes cover every requested scope.
    pub fn covers(&self, requested: &[String]) -> bool {
        requested.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Space-separated scope list in wire form.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Protocol error kinds, mapped onto OAuth2 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The client is unknown or failed authentication.
    InvalidClient,
    /// The redirect URI does not match a registered one.
    InvalidRedirectUri,
    /// The response type is outside the supported set.
    UnsupportedResponseType,
    /// The requested scopes exceed what the client may be granted.
    InvalidScope,
    /// The bearer token is missing, unknown, expired, revoked or short on scope.
    InvalidToken,
    /// The client may not use the requested response type.
    UnauthorizedClient,
    /// A collaborator failed; nothing about the request itself was decided.
    ServerError,
}

impl ErrorKind {
    /// OAuth2 wire code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidClient => "invalid_client",
            ErrorKind::InvalidRedirectUri => "invalid_redirect_uri",
            ErrorKind::UnsupportedResponseType => "unsupported_response_type",
            ErrorKind::InvalidScope => "invalid_scope",
            ErrorKind::InvalidToken => "invalid_token",
            ErrorKind::UnauthorizedClient => "unauthorized_client",
            ErrorKind::ServerError => "server_error",
        }
    }

    /// Static description. Never derived from request or store state, so
    /// responses cannot leak whether a token or client ever existed.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::InvalidClient => "Client authentication failed",
            ErrorKind::InvalidRedirectUri => "Redirect URI does not match a registered URI",
            ErrorKind::UnsupportedResponseType => "Unsupported response type",
            ErrorKind::InvalidScope => "Requested scopes exceed the client's grant",
            ErrorKind::InvalidToken => "The token is invalid",
            ErrorKind::UnauthorizedClient => "Client not authorized for this request",
            ErrorKind::ServerError => "Internal server error",
        }
    }

    /// Status hint for HTTP response layers.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidClient | ErrorKind::InvalidToken => 401,
            ErrorKind::UnauthorizedClient => 403,
            ErrorKind::ServerError => 500,
            _ => 400,
        }
    }
}

/// Infrastructure failure raised by a strategy implementation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of an authorization, token or revocation request.
#[derive(Debug, Clone)]
pub enum Decision {
    /// The request is authorized; implicit grants carry the issued token.
    Granted {
        client_id: Option<String>,
        token: Option<Token>,
    },
    /// The request is denied with a protocol error kind.
    Denied { error: ErrorKind },
}

impl Decision {
    /// Authorized with nothing attached, e.g. revocation outcomes.
    pub fn granted() -> Self {
        Decision::Granted {
            client_id: None,
            token: None,
        }
    }

    /// Authorized for a resolved client.
    pub fn granted_for(client_id: impl Into<String>) -> Self {
        Decision::Granted {
            client_id: Some(client_id.into()),
            token: None,
        }
    }

    /// Authorized with a freshly issued token.
    pub fn granted_with_token(client_id: impl Into<String>, token: Token) -> Self {
        Decision::Granted {
            client_id: Some(client_id.into()),
            token: Some(token),
        }
    }

    pub fn denied(error: ErrorKind) -> Self {
        Decision::Denied { error }
    }

    pub fn authorized(&self) -> bool {
        matches!(self, Decision::Granted { .. })
    }

    /// The error kind for denied decisions.
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            Decision::Denied { error } => Some(*error),
            Decision::Granted { .. } => None,
        }
    }

    /// The issued token, when the decision carries one.
    pub fn token(&self) -> Option<&Token> {
        match self {
            Decision::Granted { token, .. } => token.as_ref(),
            Decision::Denied { .. } => None,
        }
    }

    /// Renders the wire shape consumed by response layers.
    pub fn to_json(&self) -> Value {
        match self {
            Decision::Granted { client_id, token } => {
                let mut body = json!({ "authorized": true });
                if let Some(client_id) = client_id {
                    body["client_id"] = json!(client_id);
                }
                if let Some(token) = token {
                    body["token"] = json!({
                        "access_token": token.access_token,
                        "token_type": token.token_type,
                        "expires_in": token.expires_in(),
                        "scope": token.scope(),
                    });
                }
                body
            }
            Decision::Denied { error } => {
                warn!(
                    error_code = error.code(),
                    http_status = error.http_status(),
                    "authorization denied"
                );
                json!({
                    "authorized": false,
                    "error": error.code(),
                    "error_description": error.description(),
                })
            }
        }
    }
}
