use std::env;
use std::sync::Once;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use talenthub_backend::middleware::auth;
use talenthub_backend::models::account::Account;

static INIT: Once = Once::new();

fn init_config() {
    INIT.call_once(|| {
        env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        env::set_var(
            "DATABASE_URL",
            "postgres://localhost/talenthub_test_unreachable",
        );
        env::set_var("JWT_SECRET", "test_secret_key");
        env::set_var("SESSION_TTL_MINUTES", "60");
        env::set_var("PUBLIC_RPS", "100");
        env::set_var("APP_ENV", "production");
        env::remove_var("ENFORCE_AUTH_IN_DEV");
        talenthub_backend::config::init_config().expect("init config");
    });
}

fn guarded_app() -> Router {
    Router::new()
        .route("/admin", get(|| async { "dashboard" }))
        .route("/admin/login", get(|| async { "login page" }))
        .route("/admin/fix-accounts", get(|| async { "repair tool" }))
        .route("/api/candidates", get(|| async { "api" }))
        .route("/careers", get(|| async { "public" }))
        .layer(axum::middleware::from_fn(auth::route_guard))
}

async fn get_status(app: Router, uri: &str, auth_header: Option<String>) -> (StatusCode, Option<String>) {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = auth_header {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    (response.status(), location)
}

#[tokio::test]
async fn unauthenticated_admin_request_redirects_to_login() {
    init_config();
    let (status, location) = get_status(guarded_app(), "/admin", None).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn session_entry_paths_pass_without_a_session() {
    init_config();
    for uri in ["/admin/login", "/admin/fix-accounts"] {
        let (status, _) = get_status(guarded_app(), uri, None).await;
        assert_eq!(status, StatusCode::OK, "uri: {}", uri);
    }
}

#[tokio::test]
async fn api_and_public_paths_are_not_redirected() {
    init_config();
    for uri in ["/api/candidates", "/careers"] {
        let (status, _) = get_status(guarded_app(), uri, None).await;
        assert_eq!(status, StatusCode::OK, "uri: {}", uri);
    }
}

#[tokio::test]
async fn valid_bearer_session_passes_the_guard() {
    init_config();
    let account = Account {
        id: Uuid::new_v4(),
        email: "jo@example.com".into(),
        password_hash: "x".into(),
        full_name: None,
        designation: None,
        phone: None,
        created_at: Utc::now(),
    };
    let token = auth::issue_session(&account, "test_secret_key", 60).unwrap();
    let (status, _) = get_status(guarded_app(), "/admin", Some(format!("Bearer {}", token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn garbage_token_redirects_to_login() {
    init_config();
    let (status, location) = get_status(
        guarded_app(),
        "/admin",
        Some("Bearer not-a-real-token".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn session_cookie_passes_the_guard() {
    init_config();
    let account = Account {
        id: Uuid::new_v4(),
        email: "jo@example.com".into(),
        password_hash: "x".into(),
        full_name: None,
        designation: None,
        phone: None,
        created_at: Utc::now(),
    };
    let token = auth::issue_session(&account, "test_secret_key", 60).unwrap();

    let app = guarded_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::COOKIE, format!("theme=dark; session={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
