use serde_json::Value;
use std::sync::Arc;

use crate::db::{DocumentStore, StoreError};
use crate::errors::AppError;
use crate::models::Lead;
use crate::validation::validate_lead;

/// Collection every lead is written to.
pub const LEAD_COLLECTION: &str = "lead";

/// Validates lead submissions and writes them to the document store.
///
/// Repeated submissions are not deduplicated: the same payload sent twice
/// produces two documents with two identifiers.
#[derive(Clone)]
pub struct LeadService {
    store: Arc<dyn DocumentStore>,
}

impl LeadService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validates `raw` and, only if it is valid, inserts it.
    ///
    /// Returns the identifier assigned by the store.
    pub async fn submit(&self, raw: Value) -> Result<String, AppError> {
        let has_preferred_datetime = raw
            .get("preferred_datetime")
            .is_some_and(|value| !value.is_null());

        let lead = validate_lead(raw).map_err(|e| {
            tracing::warn!("❌ Lead rejected: {}", e);
            AppError::Validation(e)
        })?;

        if has_preferred_datetime {
            // Accepted on input but not part of the stored lead.
            tracing::warn!("⚠️  preferred_datetime supplied but not persisted");
        }

        self.store_lead(&lead).await
    }

    /// Writes an already validated lead.
    pub async fn store_lead(&self, lead: &Lead) -> Result<String, AppError> {
        let document = serde_json::to_value(lead)
            .map_err(|e| AppError::Persistence(StoreError::Write(e.to_string())))?;

        let id = self
            .store
            .insert_one(LEAD_COLLECTION, document)
            .await
            .map_err(|e| {
                tracing::error!("❌ Failed to store lead: {}", e);
                AppError::Persistence(e)
            })?;

        tracing::info!(
            "✅ Lead stored: id={}, intent={}",
            id,
            lead.user_intent.as_str()
        );
        Ok(id)
    }
}
