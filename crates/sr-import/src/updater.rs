//! Updater facade
//!
//! Owns one run's configuration, release selection, mapping catalog and
//! storage, and exposes the lifecycle steps:
//!
//! ```text
//! download ──► extract ──► import        (update = all three)
//! reset                                  (delete stored records)
//! clean                                  (delete archive + extraction dir)
//! ```

use sr_common::{Result, SrError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::{ReleaseSelection, UpdaterConfig};
use crate::entity::EntityRegistry;
use crate::extract::{extract_archive, ExtractSummary};
use crate::fetch::{DownloadProgressFn, Fetcher};
use crate::importer::{ImportSummary, Importer, ProgressFn};
use crate::maintenance::{self, CleanSummary, EntityCount, ResetSummary};
use crate::mapping::MappingCatalog;
use crate::parser::{CaretParser, RecordParser};
use crate::storage::Store;

/// Everything a full update did
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub archive: PathBuf,
    pub extract: ExtractSummary,
    pub import: ImportSummary,
}

pub struct Updater {
    config: UpdaterConfig,
    selection: ReleaseSelection,
    catalog: MappingCatalog,
    registry: Arc<EntityRegistry>,
    parser: Arc<dyn RecordParser>,
    store: Arc<dyn Store>,
}

impl Updater {
    /// Validate `config` and bind it to a catalog and a store
    pub fn new(config: UpdaterConfig, catalog: MappingCatalog, store: Arc<dyn Store>) -> Result<Self> {
        let selection = ReleaseSelection::new(&config)?;
        Ok(Self {
            config,
            selection,
            catalog,
            registry: Arc::new(EntityRegistry::standard()),
            parser: Arc::new(CaretParser),
            store,
        })
    }

    pub fn with_registry(mut self, registry: EntityRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn RecordParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    pub fn selection(&self) -> &ReleaseSelection {
        &self.selection
    }

    pub fn catalog(&self) -> &MappingCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Fetch the selected archive into the data directory
    pub async fn download(&self, on_progress: Option<&DownloadProgressFn<'_>>) -> Result<PathBuf> {
        let fetcher = Fetcher::new(self.config.timeout_secs)?;
        fetcher.fetch_with_progress(&self.selection, on_progress).await
    }

    /// Expand the downloaded archive, keeping files extracted earlier
    pub async fn extract(&self) -> Result<ExtractSummary> {
        let archive = self.selection.local_archive_file.clone();
        let dest = self.selection.local_extract_dir.clone();

        tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
            .await
            .map_err(|e| SrError::archive(format!("Extraction task failed: {}", e)))?
    }

    /// Load the extracted flat files into storage
    pub async fn import(&self, on_progress: Option<&ProgressFn<'_>>) -> Result<ImportSummary> {
        let importer = Importer::new(self.store.clone())
            .with_registry(self.registry.clone())
            .with_parser(self.parser.clone())
            .with_chunk_size(self.config.chunk_size)
            .with_parallelism(self.config.parallelism);

        importer
            .import(&self.catalog, &self.selection.local_extract_dir, on_progress)
            .await
    }

    /// Download, extract and import in sequence
    pub async fn update(
        &self,
        on_download: Option<&DownloadProgressFn<'_>>,
        on_progress: Option<&ProgressFn<'_>>,
    ) -> Result<UpdateReport> {
        info!(
            release = %self.selection.release,
            kind = %self.selection.archive_kind,
            "Starting update"
        );

        let archive = self.download(on_download).await?;
        let extract = self.extract().await?;
        let import = self.import(on_progress).await?;

        Ok(UpdateReport {
            archive,
            extract,
            import,
        })
    }

    /// Delete all stored records of every mapped entity
    pub async fn reset(&self) -> Result<ResetSummary> {
        maintenance::reset(&self.catalog, &self.registry, self.store.as_ref()).await
    }

    /// Remove the local archive and extraction directory
    pub fn clean(&self) -> Result<CleanSummary> {
        maintenance::clean(&self.selection)
    }

    /// Stored record counts per mapped entity
    pub async fn status(&self) -> Result<Vec<EntityCount>> {
        maintenance::status(&self.catalog, &self.registry, self.store.as_ref()).await
    }
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("selection", &self.selection)
            .field("entries", &self.catalog.len())
            .field("registry", &self.registry)
            .finish()
    }
}
