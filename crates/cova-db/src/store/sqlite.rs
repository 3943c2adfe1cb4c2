//! SQLite-backed document store

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};
use uuid::Uuid;

use super::{DocumentStore, UNIQUE_FIELDS};
use crate::document::{Document, Filter, StoredDocument};
use crate::error::DbError;

/// Document store persisting JSON bodies in a single SQLite table
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to a SQLite database and run migrations
    pub async fn connect(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        // Every connection to `:memory:` opens a fresh database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 8 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                collection TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)
            "#,
        )
        .execute(&self.pool)
        .await?;

        for (collection, field) in UNIQUE_FIELDS {
            let statement = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_documents_{collection}_{field} \
                 ON documents(json_extract(body, '$.{field}')) WHERE collection = '{collection}'"
            );
            sqlx::query(&statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Migration(format!("{}: {}", statement, e)))?;
        }

        info!("Database migrations completed");
        Ok(())
    }

    fn select<'a>(
        collection: &'a str,
        filter: Option<&'a Filter>,
        limit: Option<i64>,
    ) -> QueryBuilder<'a, Sqlite> {
        let mut query =
            QueryBuilder::new("SELECT id, collection, body FROM documents WHERE collection = ");
        query.push_bind(collection);

        for (field, value) in filter.map(Filter::conditions).unwrap_or_default() {
            query.push(" AND json_extract(body, ");
            query.push_bind(format!("$.{}", field));
            query.push(") IS json_extract(");
            query.push_bind(value.to_string());
            query.push(", '$')");
        }

        query.push(" ORDER BY seq ASC");
        if let Some(limit) = limit {
            query.push(" LIMIT ");
            query.push_bind(limit);
        }
        query
    }
}

impl TryFrom<&SqliteRow> for StoredDocument {
    type Error = DbError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        let id: String = row.try_get("id")?;
        let raw: String = row.try_get("body")?;

        let violation = |reason: String| DbError::SchemaViolation {
            collection: row.try_get::<String, _>("collection").unwrap_or_default(),
            id: id.clone(),
            reason,
        };

        match serde_json::from_str(&raw) {
            Ok(serde_json::Value::Object(body)) => Ok(StoredDocument { id: id.clone(), body }),
            Ok(_) => Err(violation("body is not a JSON object".to_string())),
            Err(e) => Err(violation(e.to_string())),
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<StoredDocument>, DbError> {
        let row = Self::select(collection, Some(filter), Some(1))
            .build()
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(StoredDocument::try_from).transpose()
    }

    async fn find(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> Result<Vec<StoredDocument>, DbError> {
        let rows = Self::select(collection, filter, None)
            .build()
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(StoredDocument::try_from).collect()
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<String, DbError> {
        let id = Uuid::new_v4().to_string();
        let body = serde_json::to_string(&document)?;

        debug!("Inserting document {} into {}", id, collection);

        sqlx::query(
            r#"
            INSERT INTO documents (id, collection, body, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(collection)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DbError::Duplicate(format!("{}: {}", collection, db.message()))
            }
            other => DbError::Connection(other),
        })?;

        Ok(id)
    }

    async fn list_collections(&self) -> Result<Vec<String>, DbError> {
        let rows = sqlx::query("SELECT DISTINCT collection FROM documents ORDER BY collection")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get("collection").map_err(DbError::from))
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
