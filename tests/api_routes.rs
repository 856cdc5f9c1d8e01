/// HTTP surface tests driven through the router without binding a socket
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use aquawell_api::config::Config;
use aquawell_api::db::{DocumentStore, MemoryStore, PgDocumentStore};
use aquawell_api::handlers::{app, AppState, MAX_BODY_BYTES};

fn test_config() -> Config {
    Config {
        database_url: Some("postgres://test/aquawell".to_string()),
        database_name: Some("aquawell".to_string()),
        port: 8000,
    }
}

/// The same router and middleware stack the server binary runs.
fn build_router(store: Arc<dyn DocumentStore>) -> Router {
    app(Arc::new(AppState::new(test_config(), store)))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router dispatch");
    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, payload)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn root_banner() {
    let (status, body) = send(build_router(Arc::new(MemoryStore::default())), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "AquaWell API running" }));
}

#[tokio::test]
async fn create_lead_returns_id() {
    let store = Arc::new(MemoryStore::default());
    let payload = json!({
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "user_intent": "get_quote"
    });

    let (status, body) = send(
        build_router(store.clone()),
        post_json("/api/leads", payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("ok"), Some(&json!(true)));
    let id = body.get("id").and_then(Value::as_str).expect("id");

    let docs = store.find("lead", None, None).await.unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, id);
}

#[tokio::test]
async fn invalid_lead_is_a_client_error() {
    let payload = json!({
        "full_name": "Jane Doe",
        "email": "not-an-email",
        "user_intent": "get_quote"
    });

    let (status, body) = send(
        build_router(Arc::new(MemoryStore::default())),
        post_json("/api/leads", payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body.get("detail").and_then(Value::as_str).expect("detail");
    assert!(detail.starts_with("email:"));
    assert!(body.get("id").is_none());
}

#[tokio::test]
async fn decode_failure_detail_names_the_field() {
    let payload = json!({
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "user_intent": "get_quote",
        "occupants": "4"
    });

    let (status, body) = send(
        build_router(Arc::new(MemoryStore::default())),
        post_json("/api/leads", payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let detail = body.get("detail").and_then(Value::as_str).expect("detail");
    assert!(detail.starts_with("occupants: "), "{detail}");
}

#[tokio::test]
async fn form_datetime_is_accepted_and_not_stored() {
    let store = Arc::new(MemoryStore::default());
    let payload = json!({
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "user_intent": "book_assessment",
        "preferred_datetime": "2025-03-01T10:30"
    });

    let (status, _) = send(
        build_router(store.clone()),
        post_json("/api/leads", payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let docs = store.find("lead", None, None).await.unwrap();
    assert!(docs[0].document.get("preferred_datetime").is_none());
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    let (status, body) = send(
        build_router(Arc::new(MemoryStore::default())),
        post_json("/api/leads", "full_name=Jane".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("detail").is_some());
}

#[tokio::test]
async fn unavailable_store_is_a_server_error_but_health_still_answers() {
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::connect(None, None).await);
    let app = build_router(store);

    let payload = json!({
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "user_intent": "get_quote"
    });
    let (status, body) = send(app.clone(), post_json("/api/leads", payload.to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body.get("detail").and_then(Value::as_str).expect("detail");
    assert!(detail.contains("Database not available"));

    let (status, body) = send(app, get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], json!("✅ Running"));
    assert_eq!(body["database"], json!("❌ Not Available"));
    assert_eq!(body["connection_status"], json!("Not Connected"));
    assert_eq!(body["collections"], json!([]));
}

#[tokio::test]
async fn health_lists_collections_when_connected() {
    let store = Arc::new(MemoryStore::new("aquawell"));
    store.insert_one("lead", json!({})).await.unwrap();

    let (status, body) = send(build_router(store), get("/test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], json!("✅ Connected & Working"));
    assert_eq!(body["database_url"], json!("✅ Set"));
    assert_eq!(body["database_name"], json!("aquawell"));
    assert_eq!(body["collections"], json!(["lead"]));
}

#[tokio::test]
async fn faq_has_four_items() {
    let (status, body) = send(build_router(Arc::new(MemoryStore::default())), get("/api/faq")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().expect("items");
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|item| item["q"].is_string() && item["a"].is_string()));
}

#[tokio::test]
async fn authority_signals() {
    let (status, body) = send(
        build_router(Arc::new(MemoryStore::default())),
        get("/api/authority"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["badges"][0], json!({"label": "Certified Water Specialist", "issuer": "WQA"}));
    assert_eq!(body["press"][1], json!({"name": "Home & Design", "year": 2023}));
}

#[tokio::test]
async fn openapi_document_lists_lead_route() {
    let (status, body) = send(
        build_router(Arc::new(MemoryStore::default())),
        get("/openapi.json"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/api/leads").is_some());
    assert_eq!(body["info"]["title"], json!("AquaWell Backend"));
}

#[tokio::test]
async fn oversized_body_is_rejected_by_declared_length() {
    let body = "x".repeat(MAX_BODY_BYTES + 1);
    let request = Request::builder()
        .method("POST")
        .uri("/api/leads")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("request");

    let (status, _) = send(build_router(Arc::new(MemoryStore::default())), request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn oversized_body_without_length_is_rejected_while_reading() {
    let store = Arc::new(MemoryStore::default());
    let padding = "x".repeat(MAX_BODY_BYTES);
    let payload = json!({
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "user_intent": "get_quote",
        "message": padding
    });

    let (status, body) = send(
        build_router(store.clone()),
        post_json("/api/leads", payload.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body.get("detail").is_some());
    assert!(store.find("lead", None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/faq")
        .header(header::ORIGIN, "https://aquawell.example")
        .body(Body::empty())
        .expect("request");

    let response = build_router(Arc::new(MemoryStore::default()))
        .oneshot(request)
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
}
