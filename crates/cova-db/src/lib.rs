//! COVA Database Layer
//!
//! This crate provides the document store abstraction for COVA: a small
//! collection-oriented interface with SQLite and in-memory backends, and
//! typed records that are validated as they cross the store boundary.

pub mod document;
pub mod error;
pub mod models;
pub mod repository;
pub mod store;
pub mod utils;

pub use document::{Document, Filter, StoredDocument};
pub use error::DbError;
pub use models::*;
pub use repository::{Database, MenuQuery};
pub use store::{DocumentStore, MemoryStore, SqliteStore};
