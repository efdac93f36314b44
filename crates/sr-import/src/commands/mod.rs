//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. They all start
//! from [`build_updater`], which layers CLI flags over `SR_*` environment
//! variables over defaults.

pub mod clean;
pub mod fetch;
pub mod import;
pub mod reset;
pub mod status;

use sr_common::Result;
use std::sync::Arc;
use tracing::debug;

use crate::config::UpdaterConfig;
use crate::mapping::MappingCatalog;
use crate::storage::{MemoryStore, SqliteStore, Store};
use crate::updater::Updater;
use crate::GlobalArgs;

/// Resolve configuration from flags and environment
pub fn resolve_config(args: &GlobalArgs) -> Result<UpdaterConfig> {
    let mut config = UpdaterConfig::from_env()?;

    if let Some(release) = &args.release {
        config = config.with_release(release.clone());
    }
    if let Some(kind) = args.kind {
        config = config.with_archive_kind(kind);
    }
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir.clone());
    }
    if let Some(size) = args.chunk_size {
        config = config.with_chunk_size(size);
    }
    if let Some(parallelism) = args.parallelism {
        config = config.with_parallelism(parallelism);
    }

    config.validate()?;
    Ok(config)
}

pub fn load_catalog(args: &GlobalArgs) -> Result<MappingCatalog> {
    match &args.mapping {
        Some(path) => MappingCatalog::load(path),
        None => MappingCatalog::bundled(),
    }
}

/// SQLite store at `--database`, or an in-memory store for dry runs
pub async fn open_store(args: &GlobalArgs, dry_run: bool) -> Result<Arc<dyn Store>> {
    if dry_run {
        debug!("Dry run, records are kept in memory");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SqliteStore::open(&args.database).await?;
    store.apply_schema().await?;
    Ok(Arc::new(store))
}

pub async fn build_updater(args: &GlobalArgs, dry_run: bool) -> Result<Updater> {
    let config = resolve_config(args)?;
    let catalog = load_catalog(args)?;
    let store = open_store(args, dry_run).await?;
    Updater::new(config, catalog, store)
}

/// Updater for commands that only touch local files
pub fn build_offline_updater(args: &GlobalArgs) -> Result<Updater> {
    let config = resolve_config(args)?;
    let catalog = load_catalog(args)?;
    Updater::new(config, catalog, Arc::new(MemoryStore::new()))
}
