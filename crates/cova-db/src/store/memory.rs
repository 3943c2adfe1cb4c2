//! In-process document store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use super::{DocumentStore, UNIQUE_FIELDS};
use crate::document::{Document, Filter, StoredDocument};
use crate::error::DbError;

/// Document store kept entirely in memory
///
/// Contents are lost when the process exits. Used for `memory` database
/// URLs and throughout the test suites.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<StoredDocument>, DbError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| filter.matches(&d.body)))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, DbError> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|d| filter.is_none_or(|f| f.matches(&d.body)))
            .cloned()
            .collect())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<String, DbError> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();

        for (_, field) in UNIQUE_FIELDS.iter().filter(|(c, _)| *c == collection) {
            if let Some(value) = document.get(*field)
                && docs.iter().any(|d| d.body.get(*field) == Some(value))
            {
                return Err(DbError::Duplicate(format!(
                    "{}.{} = {}",
                    collection, field, value
                )));
            }
        }

        let id = Uuid::new_v4().to_string();
        debug!("Inserting document {} into {}", id, collection);
        docs.push(StoredDocument {
            id: id.clone(),
            body: document,
        });
        Ok(id)
    }

    async fn list_collections(&self) -> Result<Vec<String>, DbError> {
        Ok(self
            .collections
            .read()
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
