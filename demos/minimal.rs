//! Minimal authorization-core example
//! Run with: `cargo run --example minimal`

use std::sync::Arc;

use oauth_forward::{
    AuthRequest, AuthorizationEngine, Client, InMemoryClientDirectory, InMemoryTokenStore,
    InMemoryUserDirectory, RequestContext, ResponseType, User, ValidatorRegistry,
};

#[tokio::main]
async fn main() {
    // Register one client and one resource owner in the in-memory stores
    let clients = InMemoryClientDirectory::new(vec![Client {
        id: "demo-app".to_string(),
        redirect_uris: vec!["https://app.example/cb".to_string()],
        scopes: vec!["users".to_string(), "posts".to_string()],
        response_types: vec![ResponseType::Token],
    }]);
    let users = InMemoryUserDirectory::new(vec![User {
        username: "userone".to_string(),
        email: "userone@example.net".to_string(),
        attributes: Default::default(),
    }]);

    let registry = ValidatorRegistry::new(
        Some(Arc::new(users.clone())),
        Arc::new(clients),
        Arc::new(InMemoryTokenStore::new()),
    )
    .expect("strategies implement their required operations");
    let engine = AuthorizationEngine::new(Arc::new(registry)).token_ttl(600);

    // Implicit-style authorization request for one scope
    let request = AuthRequest::builder()
        .client_id("demo-app")
        .redirect_uri("https://app.example/cb")
        .response_type("token")
        .scope_str("users")
        .state("af0ifjsldkj")
        .build();
    let mut ctx = match users.get("userone").await {
        Some(user) => RequestContext::for_user(user),
        None => RequestContext::new(),
    };

    let decision = engine
        .validate_authorization_request(&request, &mut ctx)
        .await
        .expect("in-memory stores do not fail");
    println!("{}", decision.to_json());

    // Revoke the issued token and show it no longer validates
    if let Some(token) = decision.token() {
        let revoke = AuthRequest::builder()
            .client_id("demo-app")
            .bearer_token(token.access_token.clone())
            .build();
        let mut ctx = RequestContext::new();
        let outcome = engine
            .validate_revocation_request(&revoke, &mut ctx)
            .await
            .expect("in-memory stores do not fail");
        println!("{}", outcome.to_json());

        let live = engine
            .authorize_token(&token.access_token, &["users".to_string()], &ctx)
            .await
            .expect("in-memory stores do not fail");
        println!("token still valid after revocation: {live}");
    }
}
