//! In-process store used for dry runs and tests

use async_trait::async_trait;
use sr_common::{Result, SrError};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::Store;
use crate::entity::{EntitySchema, Value};

/// One `bulk_insert` call as the store saw it
#[derive(Debug, Clone, PartialEq)]
pub struct InsertCall {
    pub entity_id: String,
    pub rows: usize,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<Vec<Value>>>,
    log: Vec<InsertCall>,
}

/// Rows kept per entity id, plus a log of insert calls in arrival order
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_on_insert: Option<(String, usize)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `nth` (1-based) insert for `entity_id` with a storage error
    pub fn with_failure(mut self, entity_id: impl Into<String>, nth: usize) -> Self {
        self.fail_on_insert = Some((entity_id.into(), nth));
        self
    }

    /// Stored rows of one entity, in insertion order
    pub async fn rows(&self, entity_id: &str) -> Vec<Vec<Value>> {
        self.state
            .lock()
            .await
            .tables
            .get(entity_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn insert_log(&self) -> Vec<InsertCall> {
        self.state.lock().await.log.clone()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn bulk_insert(&self, schema: &EntitySchema, rows: &[Vec<Value>]) -> Result<u64> {
        let mut state = self.state.lock().await;

        if let Some((entity_id, nth)) = &self.fail_on_insert {
            if entity_id == schema.id {
                let attempt = state.log.iter().filter(|c| c.entity_id == schema.id).count() + 1;
                if attempt == *nth {
                    return Err(SrError::storage(format!(
                        "injected failure on insert {} into {}",
                        attempt, schema.table
                    )));
                }
            }
        }

        if let Some(row) = rows.iter().find(|r| r.len() != schema.columns.len()) {
            return Err(SrError::storage(format!(
                "row for {} has {} values, table has {} columns",
                schema.table,
                row.len(),
                schema.columns.len()
            )));
        }

        state.log.push(InsertCall {
            entity_id: schema.id.to_string(),
            rows: rows.len(),
        });
        state
            .tables
            .entry(schema.id.to_string())
            .or_default()
            .extend(rows.iter().cloned());

        Ok(rows.len() as u64)
    }

    async fn delete_all(&self, schema: &EntitySchema) -> Result<u64> {
        let removed = self
            .state
            .lock()
            .await
            .tables
            .remove(schema.id)
            .map_or(0, |rows| rows.len());
        Ok(removed as u64)
    }

    async fn count(&self, schema: &EntitySchema) -> Result<u64> {
        let state = self.state.lock().await;
        Ok(state.tables.get(schema.id).map_or(0, |rows| rows.len()) as u64)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::entity::{Entity, FoodGroup};

    fn group(code: &str) -> Vec<Value> {
        vec![Value::Text(code.to_string()), Value::Text("desc".to_string())]
    }

    #[tokio::test]
    async fn test_insert_count_delete() {
        let store = MemoryStore::new();
        let schema = FoodGroup::schema();

        assert_eq!(store.bulk_insert(schema, &[group("0100"), group("0200")]).await.unwrap(), 2);
        assert_eq!(store.bulk_insert(schema, &[group("0300")]).await.unwrap(), 1);
        assert_eq!(store.count(schema).await.unwrap(), 3);
        assert_eq!(store.insert_log().await.len(), 2);

        assert_eq!(store.delete_all(schema).await.unwrap(), 3);
        assert_eq!(store.count(schema).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_wrong_row_width() {
        let store = MemoryStore::new();
        let err = store
            .bulk_insert(FoodGroup::schema(), &[vec![Value::Null]])
            .await
            .unwrap_err();
        assert!(matches!(err, SrError::Storage(_)));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new().with_failure("FoodGroup", 2);
        let schema = FoodGroup::schema();

        assert!(store.bulk_insert(schema, &[group("0100")]).await.is_ok());
        assert!(store.bulk_insert(schema, &[group("0200")]).await.is_err());
        assert_eq!(store.rows("FoodGroup").await.len(), 1);
    }
}
