//! Document store adapter.
//!
//! Documents are schema-less JSON values grouped into named collections. The
//! production backend keeps them in PostgreSQL: the logical database name is a
//! schema and each collection is a table holding one JSONB document per row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use uuid::Uuid;

/// Upper bound on the names returned by [`DocumentStore::list_collections`].
pub const MAX_LISTED_COLLECTIONS: usize = 10;

const MAX_IDENTIFIER_LEN: usize = 63;
const UNDEFINED_TABLE: &str = "42P01";

/// Connection state observed by every caller of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Connected { database_name: String },
    Unavailable { reason: String },
}

impl StoreStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, StoreStatus::Connected { .. })
    }
}

/// A document read back from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub document: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No live connection exists.
    Unavailable(String),
    /// The backend rejected or failed the write.
    Write(String),
    /// The backend failed a read.
    Read(String),
    /// Collection names must be plain identifiers.
    InvalidCollection(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "Database not available: {}", reason),
            StoreError::Write(msg) => write!(f, "Database write failed: {}", msg),
            StoreError::Read(msg) => write!(f, "Database read failed: {}", msg),
            StoreError::InvalidCollection(name) => {
                write!(f, "Invalid collection name: {:?}", name)
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current connection state. Never touches the network.
    fn status(&self) -> StoreStatus;

    /// Inserts one document and returns the identifier assigned to it.
    async fn insert_one(&self, collection: &str, document: Value) -> Result<String, StoreError>;

    /// Reads documents whose top-level fields contain `filter`, oldest first.
    async fn find(
        &self,
        collection: &str,
        filter: Option<&Value>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    /// Existing collection names, sorted, at most [`MAX_LISTED_COLLECTIONS`].
    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;
}

/// True for names safe to splice into SQL as quoted identifiers.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    name.len() <= MAX_IDENTIFIER_LEN
        && (first.is_ascii_lowercase() || first == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn check_collection(collection: &str) -> Result<(), StoreError> {
    if is_valid_identifier(collection) {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }
}

// ============ PostgreSQL Backend ============

enum Connection {
    Connected { pool: PgPool, database_name: String },
    Unavailable { reason: String },
}

/// PostgreSQL-backed document store.
///
/// The connection is attempted once, in [`PgDocumentStore::connect`]. If that
/// fails the store stays unavailable for the life of the process.
pub struct PgDocumentStore {
    connection: Connection,
    ensured: AsyncMutex<HashSet<String>>,
}

impl PgDocumentStore {
    pub async fn connect(database_url: Option<&str>, database_name: Option<&str>) -> Self {
        let (Some(url), Some(name)) = (database_url, database_name) else {
            tracing::warn!("⚠️  Document store disabled: DATABASE_URL and DATABASE_NAME are required");
            return Self::unavailable("DATABASE_URL and DATABASE_NAME must both be set");
        };

        if !is_valid_identifier(name) {
            tracing::error!("❌ Invalid DATABASE_NAME: {}", name);
            return Self::unavailable(format!("invalid database name {:?}", name));
        }

        match Self::open(url, name).await {
            Ok(pool) => {
                tracing::info!("✓ Document store connected (database: {})", name);
                Self {
                    connection: Connection::Connected {
                        pool,
                        database_name: name.to_string(),
                    },
                    ensured: AsyncMutex::new(HashSet::new()),
                }
            }
            Err(e) => {
                tracing::error!("❌ Failed to connect document store: {}", e);
                Self::unavailable(e.to_string())
            }
        }
    }

    /// A store with no connection; every operation fails with
    /// [`StoreError::Unavailable`].
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            connection: Connection::Unavailable {
                reason: reason.into(),
            },
            ensured: AsyncMutex::new(HashSet::new()),
        }
    }

    async fn open(url: &str, database_name: &str) -> Result<PgPool, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        sqlx::query(&format!(r#"CREATE SCHEMA IF NOT EXISTS "{}""#, database_name))
            .execute(&pool)
            .await?;

        Ok(pool)
    }

    fn live(&self) -> Result<(&PgPool, &str), StoreError> {
        match &self.connection {
            Connection::Connected {
                pool,
                database_name,
            } => Ok((pool, database_name.as_str())),
            Connection::Unavailable { reason } => Err(StoreError::Unavailable(reason.clone())),
        }
    }

    /// Creates the collection table on first use.
    async fn ensure_collection(
        &self,
        pool: &PgPool,
        schema: &str,
        collection: &str,
    ) -> Result<(), StoreError> {
        let mut ensured = self.ensured.lock().await;
        if ensured.contains(collection) {
            return Ok(());
        }

        sqlx::query(&collection_ddl(schema, collection))
            .execute(pool)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;

        tracing::debug!("Collection ready: {}.{}", schema, collection);
        ensured.insert(collection.to_string());
        Ok(())
    }
}

/// Table backing one collection; the insertion time sits beside the body.
fn collection_ddl(schema: &str, collection: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{schema}"."{collection}" (
            id UUID PRIMARY KEY,
            document JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#
    )
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn status(&self) -> StoreStatus {
        match &self.connection {
            Connection::Connected { database_name, .. } => StoreStatus::Connected {
                database_name: database_name.clone(),
            },
            Connection::Unavailable { reason } => StoreStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let (pool, schema) = self.live()?;
        check_collection(collection)?;
        self.ensure_collection(pool, schema, collection).await?;

        let id = Uuid::new_v4();
        sqlx::query(&format!(
            r#"INSERT INTO "{schema}"."{collection}" (id, document) VALUES ($1, $2)"#
        ))
        .bind(id)
        .bind(Json(document))
        .execute(pool)
        .await
        .map_err(|e| StoreError::Write(e.to_string()))?;

        Ok(id.to_string())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Option<&Value>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let (pool, schema) = self.live()?;
        check_collection(collection)?;

        let filter = filter.cloned().unwrap_or_else(|| Value::Object(Default::default()));
        let limit = limit.map(|n| i64::try_from(n).unwrap_or(i64::MAX));

        let rows = sqlx::query_as::<_, (Uuid, Json<Value>, DateTime<Utc>)>(&format!(
            r#"
            SELECT id, document, created_at
            FROM "{schema}"."{collection}"
            WHERE document @> $1
            ORDER BY created_at, id
            LIMIT $2
            "#
        ))
        .bind(Json(filter))
        .bind(limit)
        .fetch_all(pool)
        .await;

        match rows {
            Ok(rows) => Ok(rows
                .into_iter()
                .map(|(id, Json(document), created_at)| StoredDocument {
                    id: id.to_string(),
                    document,
                    created_at,
                })
                .collect()),
            // A collection that was never written reads as empty.
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNDEFINED_TABLE) => {
                Ok(Vec::new())
            }
            Err(e) => Err(StoreError::Read(e.to_string())),
        }
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let (pool, schema) = self.live()?;

        sqlx::query_scalar::<_, String>(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = $1
            ORDER BY table_name
            LIMIT $2
            "#,
        )
        .bind(schema)
        .bind(MAX_LISTED_COLLECTIONS as i64)
        .fetch_all(pool)
        .await
        .map_err(|e| StoreError::Read(e.to_string()))
    }
}

// ============ In-Memory Backend ============

/// Process-local store, always connected. Ids are UUID v4 strings like the
/// PostgreSQL backend's.
pub struct MemoryStore {
    database_name: String,
    collections: Mutex<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new(database_name: impl Into<String>) -> Self {
        Self {
            database_name: database_name.into(),
            collections: Mutex::new(BTreeMap::new()),
        }
    }

    fn with_collections<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<String, Vec<StoredDocument>>) -> T,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

/// Top-level containment: every key in `filter` is present in `document`
/// with an equal value.
fn matches_filter(document: &Value, filter: Option<&Value>) -> bool {
    let Some(Value::Object(wanted)) = filter else {
        return true;
    };
    wanted
        .iter()
        .all(|(key, value)| document.get(key) == Some(value))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn status(&self) -> StoreStatus {
        StoreStatus::Connected {
            database_name: self.database_name.clone(),
        }
    }

    async fn insert_one(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        check_collection(collection)?;
        let id = Uuid::new_v4().to_string();
        let stored = StoredDocument {
            id: id.clone(),
            document,
            created_at: Utc::now(),
        };
        self.with_collections(|collections| {
            collections
                .entry(collection.to_string())
                .or_default()
                .push(stored)
        })?;
        Ok(id)
    }

    async fn find(
        &self,
        collection: &str,
        filter: Option<&Value>,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        check_collection(collection)?;
        self.with_collections(|collections| {
            collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| matches_filter(&doc.document, filter))
                        .take(limit.unwrap_or(usize::MAX))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        self.with_collections(|collections| {
            collections
                .keys()
                .take(MAX_LISTED_COLLECTIONS)
                .cloned()
                .collect()
        })
    }
}
