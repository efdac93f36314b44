//! SQLite store built on sqlx
//!
//! Tables come from the bundled `schema.sql`; every entity table has an
//! integer `id` primary key followed by the entity's columns.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use sr_common::{Result, SrError};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use super::Store;
use crate::entity::{EntitySchema, Value};

/// Bundled DDL, `CREATE TABLE IF NOT EXISTS` statements only
pub const SCHEMA_SQL: &str = include_str!("../../schema.sql");

/// Highest bound-parameter index SQLite accepts in one statement
const MAX_BIND_PARAMS: usize = 32_766;

const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> SrError {
    move |e| SrError::storage(format!("{}: {}", context, e))
}

/// [`Store`] backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(storage_error("Failed to open database"))?;

        info!(path = %path.display(), "Opened SQLite database");
        Ok(Self { pool })
    }

    /// Connect with a `sqlite:` URL, creating the file when missing
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage_error("Invalid database URL"))?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(storage_error("Failed to connect to database"))?;

        Ok(Self { pool })
    }

    /// Private in-memory database
    ///
    /// Every connection to `sqlite::memory:` gets its own database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(storage_error("Failed to open in-memory database"))?;

        Ok(Self { pool })
    }

    /// Create any missing entity tables
    pub async fn apply_schema(&self) -> Result<()> {
        let mut applied = 0usize;
        for statement in SCHEMA_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(storage_error("Failed to apply schema"))?;
            applied += 1;
        }
        debug!(statements = applied, "Applied schema");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn insert_prefix(schema: &EntitySchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO \"{}\" ({}) ", schema.table, columns)
}

#[async_trait]
impl Store for SqliteStore {
    async fn bulk_insert(&self, schema: &EntitySchema, rows: &[Vec<Value>]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let width = schema.columns.len().max(1);
        let rows_per_statement = (MAX_BIND_PARAMS / width).max(1);
        let prefix = insert_prefix(schema);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("Failed to begin transaction"))?;

        let mut inserted = 0u64;
        for chunk in rows.chunks(rows_per_statement) {
            let mut query_builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(prefix.as_str());
            query_builder.push_values(chunk, |mut b, row| {
                for value in row {
                    match value {
                        Value::Null => b.push_bind(None::<String>),
                        Value::Integer(v) => b.push_bind(*v),
                        Value::Real(v) => b.push_bind(*v),
                        Value::Text(v) => b.push_bind(v.clone()),
                    };
                }
            });

            let result = query_builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| SrError::storage(format!("Failed to insert into {}: {}", schema.table, e)))?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(storage_error("Failed to commit batch"))?;

        debug!(table = schema.table, rows = inserted, "Inserted batch");
        Ok(inserted)
    }

    async fn delete_all(&self, schema: &EntitySchema) -> Result<u64> {
        let result = sqlx::query(&format!("DELETE FROM \"{}\"", schema.table))
            .execute(&self.pool)
            .await
            .map_err(|e| SrError::storage(format!("Failed to delete from {}: {}", schema.table, e)))?;
        Ok(result.rows_affected())
    }

    async fn count(&self, schema: &EntitySchema) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", schema.table))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| SrError::storage(format!("Failed to count {}: {}", schema.table, e)))?;
        Ok(count.max(0) as u64)
    }
}
