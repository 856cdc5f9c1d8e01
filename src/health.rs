//! Store diagnostics for `GET /test`.
//!
//! Building the report never fails: every store error is folded into the
//! `database` status string.

use std::time::Duration;

use crate::config::Config;
use crate::db::{DocumentStore, StoreStatus, MAX_LISTED_COLLECTIONS};
use crate::models::HealthReport;

const LIST_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ERROR_CHARS: usize = 80;

pub async fn health_report(store: &dyn DocumentStore, config: &Config) -> HealthReport {
    let mut report = HealthReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: None,
        database_name: None,
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    if let StoreStatus::Unavailable { reason } = store.status() {
        tracing::debug!("Health check: store unavailable ({})", reason);
        return report;
    }

    report.database = "✅ Available".to_string();
    report.database_url = Some(if config.database_url.is_some() {
        "✅ Set".to_string()
    } else {
        "❌ Not Set".to_string()
    });
    report.database_name = Some(
        config
            .database_name
            .clone()
            .unwrap_or_else(|| "❌ Not Set".to_string()),
    );
    report.connection_status = "Connected".to_string();

    let listing = tokio::time::timeout(LIST_TIMEOUT, store.list_collections()).await;
    match listing {
        Ok(Ok(mut collections)) => {
            collections.truncate(MAX_LISTED_COLLECTIONS);
            report.collections = collections;
            report.database = "✅ Connected & Working".to_string();
        }
        Ok(Err(e)) => {
            report.database = format!("⚠️ Connected but Error: {}", truncate(&e.to_string()));
        }
        Err(_) => {
            report.database = format!(
                "⚠️ Connected but Error: listing collections timed out after {}s",
                LIST_TIMEOUT.as_secs()
            );
        }
    }

    report
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}
