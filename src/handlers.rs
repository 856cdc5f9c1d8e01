use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::config::Config;
use crate::content;
use crate::db::DocumentStore;
use crate::errors::AppError;
use crate::health::health_report;
use crate::models::*;
use crate::services::LeadService;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Document store, connected or not.
    pub store: Arc<dyn DocumentStore>,
    /// Lead intake service backed by `store`.
    pub leads: LeadService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let leads = LeadService::new(store.clone());
        Self {
            config,
            store,
            leads,
        }
    }
}

/// Maximum accepted request body (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The full application: every route plus body limit, tracing and CORS.
pub fn app(state: Arc<AppState>) -> Router {
    router(state)
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1 MiB max payload
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Builds every route of the API without middleware.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/test", get(test_database))
        .route("/api/leads", post(create_lead))
        .route("/api/faq", get(get_faq))
        .route("/api/authority", get(get_authority))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
        .with_state(state)
}

/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = RootResponse))
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "AquaWell API running".to_string(),
    })
}

/// GET /test
///
/// Health check for database connectivity. Always answers 200; store problems
/// are described in the body.
#[utoipa::path(
    get,
    path = "/test",
    responses((status = 200, description = "Backend and store status", body = HealthReport))
)]
pub async fn test_database(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(health_report(state.store.as_ref(), &state.config).await)
}

/// POST /api/leads
///
/// Validates the submission and stores it in the `lead` collection.
///
/// # Returns
///
/// * `{ "ok": true, "id": ... }` on success.
/// * 400 when the body is not JSON, 413 when it exceeds the body limit, 422 when it fails validation, 500 when the
///   store is unavailable or rejects the write. Error bodies are
///   `{ "detail": ... }`.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = LeadCreate,
    responses(
        (status = 200, description = "Lead stored", body = LeadCreatedResponse),
        (status = 400, description = "Body is not JSON", body = ErrorResponse),
        (status = 413, description = "Body exceeds the size limit", body = ErrorResponse),
        (status = 422, description = "Lead failed validation", body = ErrorResponse),
        (status = 500, description = "Lead could not be stored", body = ErrorResponse)
    )
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LeadCreatedResponse>, AppError> {
    let Json(raw) = payload.map_err(|rejection| {
        tracing::warn!("❌ Unreadable lead body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })?;

    let id = state.leads.submit(raw).await?;

    Ok(Json(LeadCreatedResponse { ok: true, id }))
}

/// GET /api/faq
#[utoipa::path(
    get,
    path = "/api/faq",
    responses((status = 200, description = "Fixed FAQ entries", body = FaqResponse))
)]
pub async fn get_faq() -> Json<FaqResponse> {
    Json(content::faq())
}

/// GET /api/authority
#[utoipa::path(
    get,
    path = "/api/authority",
    responses((status = 200, description = "Badges and press mentions", body = AuthoritySignals))
)]
pub async fn get_authority() -> Json<AuthoritySignals> {
    Json(content::authority())
}

#[derive(OpenApi)]
#[openapi(
    info(title = "AquaWell Backend", version = "1.0.0"),
    paths(root, test_database, create_lead, get_faq, get_authority),
    components(schemas(
        LeadCreate,
        Lead,
        UserIntent,
        PropertyType,
        Concern,
        BudgetRange,
        LeadCreatedResponse,
        ErrorResponse,
        RootResponse,
        HealthReport,
        FaqItem,
        FaqResponse,
        Badge,
        PressMention,
        AuthoritySignals
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves a Swagger UI page that loads `/openapi.json`.
pub async fn swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AquaWell API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}
