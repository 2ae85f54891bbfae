use std::sync::Arc;

use oauth_forward::{
    AuthRequest, AuthRequirements, AuthorizationEngine, Client, Decision, ErrorKind,
    InMemoryClientDirectory, InMemoryTokenStore, RequestContext, ResponseType, RouteGuard,
    ValidatorRegistry,
};

fn app_client() -> Client {
    Client {
        id: "c1".to_string(),
        redirect_uris: vec!["https://app.example/cb".to_string()],
        scopes: vec!["users".to_string(), "posts".to_string()],
        response_types: vec![ResponseType::Token],
    }
}

fn engine() -> Arc<AuthorizationEngine> {
    let registry = ValidatorRegistry::new(
        None,
        Arc::new(InMemoryClientDirectory::new(vec![app_client()])),
        Arc::new(InMemoryTokenStore::new()),
    )
    .unwrap();
    Arc::new(AuthorizationEngine::new(Arc::new(registry)))
}

async fn issue(engine: &AuthorizationEngine, scopes: &[String]) -> String {
    let ctx = RequestContext::new();
    engine
        .lifecycle()
        .issue("c1", Some("userone"), scopes, &ctx)
        .await
        .unwrap()
        .access_token
}

#[tokio::test]
async fn test_guard_grants_full_requirements() {
    let engine = engine();
    let token = issue(&engine, &["users".to_string()]).await;
    let guard = RouteGuard::new(
        engine.clone(),
        AuthRequirements::new()
            .client_auth(true)
            .token_auth(true)
            .scope("users"),
    );
    let request = AuthRequest::builder()
        .client_id("c1")
        .bearer_token(token)
        .build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert!(decision.authorized());
    assert!(matches!(
        decision,
        Decision::Granted { client_id: Some(ref id), .. } if id == "c1"
    ));
}

#[tokio::test]
async fn test_guard_rejects_unknown_client() {
    let engine = engine();
    let guard = RouteGuard::new(engine, AuthRequirements::new().client_auth(true));
    let request = AuthRequest::builder().client_id("ghost").build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert_eq!(decision.error(), Some(ErrorKind::InvalidClient));
}

#[tokio::test]
async fn test_guard_requires_bearer_token() {
    let engine = engine();
    let guard = RouteGuard::new(engine, AuthRequirements::new().token_auth(true));
    let request = AuthRequest::builder().client_id("c1").build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert_eq!(decision.error(), Some(ErrorKind::InvalidToken));
}

#[tokio::test]
async fn test_guard_denies_missing_scope() {
    let engine = engine();
    let token = issue(&engine, &["posts".to_string()]).await;
    let guard = RouteGuard::new(
        engine,
        AuthRequirements::new().token_auth(true).scope("users"),
    );
    let request = AuthRequest::builder()
        .client_id("c1")
        .bearer_token(token)
        .build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert_eq!(decision.error(), Some(ErrorKind::InvalidToken));
}

#[tokio::test]
async fn test_guard_denies_revoked_token() {
    let engine = engine();
    let token = issue(&engine, &["users".to_string()]).await;
    let ctx = RequestContext::new();
    engine.lifecycle().revoke(&token, None, &ctx).await.unwrap();

    let guard = RouteGuard::new(
        engine,
        AuthRequirements::new().token_auth(true).scope("users"),
    );
    let request = AuthRequest::builder()
        .client_id("c1")
        .bearer_token(token)
        .build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert_eq!(decision.error(), Some(ErrorKind::InvalidToken));
}

#[tokio::test]
async fn test_guard_denies_another_clients_token() {
    let engine = engine();
    let ctx = RequestContext::new();
    let token = engine
        .lifecycle()
        .issue("c2", None, &["users".to_string()], &ctx)
        .await
        .unwrap()
        .access_token;

    let guard = RouteGuard::new(
        engine,
        AuthRequirements::new()
            .client_auth(true)
            .token_auth(true)
            .scope("users"),
    );
    let request = AuthRequest::builder()
        .client_id("c1")
        .bearer_token(token)
        .build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert_eq!(decision.error(), Some(ErrorKind::InvalidToken));
}

#[test]
fn test_requirements_scope_builders() {
    let requirements = AuthRequirements::new().scope("users").scope("posts");
    assert_eq!(
        requirements.required_scopes(),
        ["users".to_string(), "posts".to_string()]
    );
    let replaced = requirements.scopes(vec!["admin".to_string()]);
    assert_eq!(replaced.required_scopes(), ["admin".to_string()]);
}

#[tokio::test]
async fn test_unconfigured_guard_passes_through() {
    let engine = engine();
    let guard = RouteGuard::new(engine, AuthRequirements::new());
    let request = AuthRequest::builder().build();
    let mut ctx = RequestContext::new();

    let decision = guard.check(&request, &mut ctx).await.unwrap();
    assert!(decision.authorized());
    assert!(matches!(
        decision,
        Decision::Granted {
            client_id: None,
            token: None,
        }
    ));
}
