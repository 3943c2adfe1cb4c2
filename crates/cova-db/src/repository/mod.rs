//! Typed repository over a document store

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, warn};

use crate::document::{Filter, StoredDocument, to_document};
use crate::error::DbError;
use crate::models::Validate;
use crate::store::{self, DocumentStore, MemoryStore};

// Submodules
mod bookings;
mod locations;
mod menu;
mod orders;
mod users;

pub use menu::MenuQuery;

/// Database handle shared across handlers
///
/// Holds no store at all in degraded mode: reads then come back empty and
/// writes fail with [`DbError::Unavailable`].
#[derive(Clone)]
pub struct Database {
    store: Option<Arc<dyn DocumentStore>>,
}

impl Database {
    /// Open the store behind a database URL
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        let store = store::open(database_url).await?;
        info!("Document store ready ({})", store.backend_name());
        Ok(Self::with_store(store))
    }

    /// Wrap an existing store
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    /// Fresh in-memory store
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// No document store configured
    pub fn unavailable() -> Self {
        warn!("No document store configured, running in degraded mode");
        Self { store: None }
    }

    pub fn is_available(&self) -> bool {
        self.store.is_some()
    }

    /// Backend name for diagnostics
    pub fn backend_name(&self) -> Option<&'static str> {
        self.store.as_ref().map(|s| s.backend_name())
    }

    /// Collections currently holding documents
    pub async fn list_collections(&self) -> Result<Vec<String>, DbError> {
        match &self.store {
            Some(store) => store.list_collections().await,
            None => Err(DbError::Unavailable),
        }
    }

    async fn find_one_as<T>(&self, collection: &str, filter: &Filter) -> Result<Option<T>, DbError>
    where
        T: DeserializeOwned + Validate,
    {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        store
            .find_one(collection, filter)
            .await?
            .map(|doc| decode(collection, doc))
            .transpose()
    }

    async fn find_as<T>(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<T>, DbError>
    where
        T: DeserializeOwned + Validate,
    {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };

        store
            .find(collection, filter)
            .await?
            .into_iter()
            .map(|doc| decode(collection, doc))
            .collect()
    }

    async fn insert_record<T>(&self, collection: &str, record: &T) -> Result<String, DbError>
    where
        T: Serialize + Validate,
    {
        record.validate().map_err(DbError::InvalidRecord)?;

        let store = self.store.as_ref().ok_or(DbError::Unavailable)?;
        store.insert(collection, to_document(record)?).await
    }
}

/// Convert a stored document into a typed record, rejecting malformed ones
fn decode<T>(collection: &str, doc: StoredDocument) -> Result<T, DbError>
where
    T: DeserializeOwned + Validate,
{
    let id = doc.id.clone();
    let violation = |reason: String| DbError::SchemaViolation {
        collection: collection.to_string(),
        id: id.clone(),
        reason,
    };

    let record: T = serde_json::from_value(doc.into_value()).map_err(|e| violation(e.to_string()))?;
    record.validate().map_err(violation)?;
    Ok(record)
}
