//! Import orchestration
//!
//! For every mapping entry whose entity is registered, rows of the entity's
//! flat file are turned into records through the entity's attribute setters
//! and loaded into storage in batches of `chunk_size`:
//!
//! ```text
//! catalog entry ──► registry.resolve ──► bind attribute order
//!                                             │
//!       extract_dir/file_name ──► parser ──► build record ──► batch ──► store.bulk_insert
//!                                                                  └──► progress event
//! ```
//!
//! Every entry is bound before the first row is read, so a bad attribute
//! order aborts the run without writing anything. After that, a failure stops
//! the current entity and every entity not yet started; batches already
//! loaded stay in storage.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use sr_common::{Result, SrError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{DEFAULT_CHUNK_SIZE, DEFAULT_PARALLELISM};
use crate::entity::{AttributeBinding, Entity, EntityRegistry, Value};
use crate::mapping::{MappingCatalog, MappingEntry};
use crate::parser::{count_lines, CaretParser, RecordParser, Row, RowIter};
use crate::storage::Store;

/// Progress of one entity's import
///
/// `records_total_estimate` is the line count of the source file. Blank
/// lines and end-of-file markers are counted too, so the final
/// `records_imported` can fall short of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportProgress {
    pub entity_id: String,
    pub records_imported: u64,
    pub records_total_estimate: u64,
}

/// Progress callback, invoked after every loaded batch
///
/// The callback may borrow from the caller for the duration of the run.
pub type ProgressFn<'a> = dyn Fn(&ImportProgress) + Send + Sync + 'a;

/// Outcome for one imported entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub entity_id: String,
    pub file: PathBuf,
    pub records: u64,
    pub batches: u64,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Imported entities, in catalog order
    pub entities: Vec<EntityReport>,
    /// Mapping entries whose entity is not registered
    pub skipped: Vec<String>,
}

impl ImportSummary {
    pub fn total_records(&self) -> u64 {
        self.entities.iter().map(|e| e.records).sum()
    }
}

/// What a loader needs from the run
pub struct LoadContext<'a> {
    pub store: &'a dyn Store,
    pub parser: &'a dyn RecordParser,
    pub extract_dir: &'a Path,
    pub chunk_size: usize,
    pub on_progress: Option<&'a ProgressFn<'a>>,
}

/// One bound mapping entry, ready to stream its file into storage
#[async_trait]
pub trait EntityLoad: Send + Sync {
    fn entity_id(&self) -> &str;

    async fn load(&self, ctx: &LoadContext<'_>) -> Result<EntityReport>;
}

/// Typed loader for entity `E`
pub struct EntityLoader<E: Entity> {
    entry: MappingEntry,
    binding: AttributeBinding<E>,
}

impl<E: Entity> EntityLoader<E> {
    pub fn new(entry: MappingEntry, binding: AttributeBinding<E>) -> Self {
        Self { entry, binding }
    }

    async fn flush(
        &self,
        ctx: &LoadContext<'_>,
        batch: &mut Vec<Vec<Value>>,
        imported: &mut u64,
        total: u64,
    ) -> Result<()> {
        ctx.store.bulk_insert(E::schema(), batch).await?;
        *imported += batch.len() as u64;
        batch.clear();

        debug!(entity = %self.entry.entity_id, imported = *imported, total, "Loaded batch");
        if let Some(on_progress) = ctx.on_progress {
            on_progress(&ImportProgress {
                entity_id: self.entry.entity_id.clone(),
                records_imported: *imported,
                records_total_estimate: total,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> EntityLoad for EntityLoader<E> {
    fn entity_id(&self) -> &str {
        &self.entry.entity_id
    }

    async fn load(&self, ctx: &LoadContext<'_>) -> Result<EntityReport> {
        let path = ctx.extract_dir.join(&self.entry.file_name);
        let total = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || count_lines(&path))
                .await
                .map_err(reader_failed)??
        };
        let chunk_size = ctx.chunk_size.max(1);

        info!(
            entity = %self.entry.entity_id,
            file = %path.display(),
            estimated_records = total,
            "Importing entity"
        );

        let mut rows = ctx.parser.open(&path)?;
        let mut batch: Vec<Vec<Value>> = Vec::with_capacity(chunk_size.min(total as usize));
        let mut imported = 0u64;
        let mut batches = 0u64;

        loop {
            let (rest, chunk) = read_rows(rows, chunk_size).await?;
            rows = rest;
            let exhausted = chunk.len() < chunk_size;

            for row in chunk {
                let record = self.binding.build(&row.values, row.line)?;
                batch.push(record.to_row());
            }

            if !batch.is_empty() {
                self.flush(ctx, &mut batch, &mut imported, total).await?;
                batches += 1;
            }
            if exhausted {
                break;
            }
        }

        info!(
            entity = %self.entry.entity_id,
            records = imported,
            batches,
            "Imported entity"
        );

        Ok(EntityReport {
            entity_id: self.entry.entity_id.clone(),
            file: path,
            records: imported,
            batches,
        })
    }
}

/// Pull up to `limit` rows on the blocking pool, off the runtime threads
async fn read_rows(mut rows: RowIter, limit: usize) -> Result<(RowIter, Vec<Row>)> {
    tokio::task::spawn_blocking(move || {
        let mut chunk = Vec::with_capacity(limit);
        for row in rows.by_ref().take(limit) {
            chunk.push(row?);
        }
        Ok::<_, SrError>((rows, chunk))
    })
    .await
    .map_err(reader_failed)?
}

fn reader_failed(e: tokio::task::JoinError) -> SrError {
    SrError::Other(anyhow::anyhow!("File reader task failed: {}", e))
}

/// Streams mapped flat files into a [`Store`]
#[derive(Clone)]
pub struct Importer {
    registry: Arc<EntityRegistry>,
    store: Arc<dyn Store>,
    parser: Arc<dyn RecordParser>,
    chunk_size: usize,
    parallelism: usize,
}

impl Importer {
    /// Importer over the standard SR entities with the caret parser
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            registry: Arc::new(EntityRegistry::standard()),
            store,
            parser: Arc::new(CaretParser),
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallelism: DEFAULT_PARALLELISM,
        }
    }

    pub fn with_registry(mut self, registry: Arc<EntityRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn RecordParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of entities loaded concurrently; 1 keeps strict catalog order
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Import every resolvable entry of `catalog` from `extract_dir`
    pub async fn import(
        &self,
        catalog: &MappingCatalog,
        extract_dir: &Path,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<ImportSummary> {
        if self.chunk_size == 0 {
            return Err(SrError::config("Chunk size must be at least 1"));
        }

        let (loaders, skipped) = self.prepare(catalog)?;

        info!(
            entities = loaders.len(),
            skipped = skipped.len(),
            chunk_size = self.chunk_size,
            parallelism = self.parallelism,
            extract_dir = %extract_dir.display(),
            "Starting import"
        );

        let ctx = LoadContext {
            store: self.store.as_ref(),
            parser: self.parser.as_ref(),
            extract_dir,
            chunk_size: self.chunk_size,
            on_progress,
        };

        let entities: Vec<EntityReport> = stream::iter(loaders.iter())
            .map(|loader| loader.load(&ctx))
            .buffered(self.parallelism.max(1))
            .try_collect()
            .await?;

        let summary = ImportSummary { entities, skipped };
        info!(
            entities = summary.entities.len(),
            records = summary.total_records(),
            "Import completed"
        );
        Ok(summary)
    }

    /// Resolve and bind every entry, in catalog order
    fn prepare(&self, catalog: &MappingCatalog) -> Result<(Vec<Box<dyn EntityLoad>>, Vec<String>)> {
        let mut loaders = Vec::with_capacity(catalog.len());
        let mut skipped = Vec::new();

        for entry in catalog.entries() {
            match self.registry.resolve(&entry.entity_id) {
                Some(handle) => loaders.push(handle.prepare(entry)?),
                None => {
                    debug!(entity = %entry.entity_id, "Entity not registered, skipping");
                    skipped.push(entry.entity_id.clone());
                },
            }
        }

        Ok((loaders, skipped))
    }
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("registry", &self.registry)
            .field("chunk_size", &self.chunk_size)
            .field("parallelism", &self.parallelism)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn catalog(yaml: &str) -> MappingCatalog {
        MappingCatalog::from_yaml(yaml).unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_imports_food_groups() {
        let dir = TempDir::new().unwrap();
        write(&dir, "FD_GROUP.txt", "~0100~^~Dairy and Egg Products~\r\n~0200~^~Spices and Herbs~\r\n");

        let store = Arc::new(MemoryStore::new());
        let importer = Importer::new(store.clone()).with_chunk_size(1);
        let events = Mutex::new(Vec::new());
        let on_progress = |p: &ImportProgress| events.lock().unwrap().push(p.clone());

        let summary = importer
            .import(
                &catalog("FoodGroup: {file_name: FD_GROUP.txt, attribute_order: [fdgrp_cd, fdgrp_desc]}"),
                dir.path(),
                Some(&on_progress),
            )
            .await
            .unwrap();

        assert_eq!(summary.total_records(), 2);
        assert_eq!(summary.entities[0].batches, 2);
        assert_eq!(events.lock().unwrap().len(), 2);

        let rows = store.rows("FoodGroup").await;
        assert_eq!(rows[1][1], Value::Text("Spices and Herbs".to_string()));
    }

    #[tokio::test]
    async fn test_missing_file_aborts() {
        let dir = TempDir::new().unwrap();
        let importer = Importer::new(Arc::new(MemoryStore::new()));
        let err = importer
            .import(
                &catalog("FoodGroup: {file_name: FD_GROUP.txt, attribute_order: [fdgrp_cd]}"),
                dir.path(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SrError::Io(_)));
        assert!(err.to_string().contains("FD_GROUP.txt"));
    }

    #[tokio::test]
    async fn test_zero_chunk_size_rejected() {
        let dir = TempDir::new().unwrap();
        let importer = Importer::new(Arc::new(MemoryStore::new())).with_chunk_size(0);
        let err = importer
            .import(&MappingCatalog::default(), dir.path(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SrError::Config(_)));
    }
}
