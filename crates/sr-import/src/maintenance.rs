//! Reset, cleanup and status
//!
//! None of these ask for confirmation; that is left to the caller.

use serde::Serialize;
use sr_common::Result;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ReleaseSelection;
use crate::entity::EntityRegistry;
use crate::fetch::partial_path;
use crate::mapping::MappingCatalog;
use crate::storage::Store;

/// Records removed per entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
    pub deleted: Vec<(String, u64)>,
}

impl ResetSummary {
    pub fn total(&self) -> u64 {
        self.deleted.iter().map(|(_, n)| n).sum()
    }
}

/// Delete every stored record of each mapped, registered entity
pub async fn reset(
    catalog: &MappingCatalog,
    registry: &EntityRegistry,
    store: &dyn Store,
) -> Result<ResetSummary> {
    let mut summary = ResetSummary::default();

    for entry in catalog.entries() {
        let Some(handle) = registry.resolve(&entry.entity_id) else {
            debug!(entity = %entry.entity_id, "Entity not registered, nothing to reset");
            continue;
        };

        let deleted = store.delete_all(handle.schema()).await?;
        info!(entity = %entry.entity_id, deleted, "Reset entity");
        summary.deleted.push((entry.entity_id.clone(), deleted));
    }

    Ok(summary)
}

/// What `clean` removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanSummary {
    pub removed_archive: Option<PathBuf>,
    pub removed_extract_dir: Option<PathBuf>,
}

/// Remove the downloaded archive and its extraction directory
///
/// Missing files are not an error. A leftover partial download is removed too.
pub fn clean(selection: &ReleaseSelection) -> Result<CleanSummary> {
    let archive = &selection.local_archive_file;
    let extract_dir = &selection.local_extract_dir;

    let removed_archive = remove(archive, |p| std::fs::remove_file(p))?;
    remove(&partial_path(archive), |p| std::fs::remove_file(p))?;
    let removed_extract_dir = remove(extract_dir, |p| std::fs::remove_dir_all(p))?;

    info!(
        archive = %archive.display(),
        extract_dir = %extract_dir.display(),
        "Cleaned release files"
    );

    Ok(CleanSummary {
        removed_archive,
        removed_extract_dir,
    })
}

fn remove(path: &Path, op: fn(&Path) -> io::Result<()>) -> Result<Option<PathBuf>> {
    match op(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed");
            Ok(Some(path.to_path_buf()))
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to remove");
            Err(e.into())
        },
    }
}

/// Stored record count of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityCount {
    pub entity_id: String,
    pub table: String,
    pub records: u64,
}

/// Record counts for each mapped, registered entity, in catalog order
pub async fn status(
    catalog: &MappingCatalog,
    registry: &EntityRegistry,
    store: &dyn Store,
) -> Result<Vec<EntityCount>> {
    let mut counts = Vec::new();
    for entry in catalog.entries() {
        if let Some(handle) = registry.resolve(&entry.entity_id) {
            let schema = handle.schema();
            counts.push(EntityCount {
                entity_id: entry.entity_id.clone(),
                table: schema.table.to_string(),
                records: store.count(schema).await?,
            });
        }
    }
    Ok(counts)
}
