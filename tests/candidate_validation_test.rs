use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use serde_json::{json, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

// A lazy pool never connects until a query runs, and every request below
// is rejected by validation before any query does.
fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/talenthub_test_unreachable")
        .expect("lazy pool");
    let state = talenthub_backend::AppState::new(pool);

    Router::new()
        .route(
            "/api/candidates",
            post(talenthub_backend::routes::candidate_routes::create_candidate),
        )
        .with_state(state)
}

fn valid_candidate() -> JsonValue {
    json!({
        "name": "Jo Doe",
        "email": "jo@example.com",
        "position": "Backend Engineer",
        "skills": ["rust", "sql"],
        "experience": 4,
        "education": "BSc Computer Science",
        "status": "new"
    })
}

async fn post_candidate(app: Router, body: JsonValue) -> (StatusCode, JsonValue) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/candidates")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, parsed)
}

#[tokio::test]
async fn create_rejects_each_missing_required_field_by_name() {
    for field in [
        "name",
        "email",
        "position",
        "skills",
        "experience",
        "education",
        "status",
    ] {
        let mut body = valid_candidate();
        body.as_object_mut().unwrap().remove(field);

        let (status, parsed) = post_candidate(test_app(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "field: {}", field);
        assert_eq!(
            parsed["error"],
            format!("Missing required field: {}", field),
            "field: {}",
            field
        );
    }
}

#[tokio::test]
async fn create_rejects_null_required_field() {
    let mut body = valid_candidate();
    body["skills"] = JsonValue::Null;

    let (status, parsed) = post_candidate(test_app(), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "Missing required field: skills");
}

#[tokio::test]
async fn create_rejects_unknown_status() {
    let mut body = valid_candidate();
    body["status"] = json!("shortlisted");

    let (status, parsed) = post_candidate(test_app(), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parsed["error"], "Invalid status value: shortlisted");
}

#[tokio::test]
async fn create_rejects_non_json_body() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/candidates")
                .header("content-type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
