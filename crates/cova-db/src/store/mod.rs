//! Document store backends

use async_trait::async_trait;

use crate::document::{Document, Filter, StoredDocument};
use crate::error::DbError;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Fields that must be unique within a collection, enforced by every backend
pub const UNIQUE_FIELDS: &[(&str, &str)] = &[("user", "email")];

/// Collection-oriented persistence backend
///
/// Implementations store schemaless JSON documents grouped by collection
/// name. No multi-document atomicity is promised.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return the first document in insertion order matching the filter
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<StoredDocument>, DbError>;

    /// Return all documents matching the filter, in insertion order
    async fn find(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, DbError>;

    /// Insert a document and return its newly assigned id
    async fn insert(&self, collection: &str, document: Document) -> Result<String, DbError>;

    /// Names of collections holding at least one document
    async fn list_collections(&self) -> Result<Vec<String>, DbError>;

    /// Short backend name for diagnostics
    fn backend_name(&self) -> &'static str;
}

/// Open a store from a URL: `memory` for an in-process store, anything else is handed to SQLite
pub async fn open(url: &str) -> Result<std::sync::Arc<dyn DocumentStore>, DbError> {
    if url == "memory" || url == "memory://" {
        Ok(std::sync::Arc::new(MemoryStore::new()))
    } else {
        Ok(std::sync::Arc::new(SqliteStore::connect(url).await?))
    }
}
