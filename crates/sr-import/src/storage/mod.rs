//! Storage backends
//!
//! The importer hands storage one batch of already-built rows per call. Rows
//! are ordered by [`EntitySchema::columns`].

mod memory;
mod sqlite;

pub use memory::{InsertCall, MemoryStore};
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use sr_common::Result;

use crate::entity::{EntitySchema, Value};

/// Bulk record storage, one table per entity
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert one batch, returning the number of rows written
    async fn bulk_insert(&self, schema: &EntitySchema, rows: &[Vec<Value>]) -> Result<u64>;

    /// Delete every record of the entity, returning the number removed
    async fn delete_all(&self, schema: &EntitySchema) -> Result<u64>;

    async fn count(&self, schema: &EntitySchema) -> Result<u64>;
}
