use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aquawell_api::config::Config;
use aquawell_api::db::PgDocumentStore;
use aquawell_api::handlers::{self, AppState};

/// Main entry point for the application.
///
/// Initializes logging, loads configuration, makes the single connection
/// attempt to the document store and starts the Axum server. A store that
/// cannot be reached does not stop startup; the API runs with the store
/// marked unavailable.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aquawell_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Connect document store (once; degraded if it fails)
    let store = PgDocumentStore::connect(
        config.database_url.as_deref(),
        config.database_name.as_deref(),
    )
    .await;

    let app_state = Arc::new(AppState::new(config.clone(), Arc::new(store)));

    let app = handlers::app(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
