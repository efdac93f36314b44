//! Idempotent zip extraction
//!
//! Entries whose destination file already exists are left alone, so a second
//! run over the same archive writes nothing. Each entry is written to a
//! `.part` sibling and renamed when complete; an interrupted run therefore
//! never leaves a truncated file that a later run would skip.
//!
//! Files that already exist are trusted as they are. Remove the extraction
//! directory (`clean`) to force a fresh extraction.

use serde::Serialize;
use sr_common::{Result, SrError};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::ZipArchive;

use crate::fetch::partial_path;

/// Files written and files left in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractSummary {
    pub extracted: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Expand `archive` into `dest`, skipping files that already exist
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<ExtractSummary> {
    let file = File::open(archive).map_err(|e| {
        SrError::archive(format!("Failed to open archive {}: {}", archive.display(), e))
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| {
        SrError::archive(format!("Failed to read archive {}: {}", archive.display(), e))
    })?;

    fs::create_dir_all(dest)?;
    info!(
        archive = %archive.display(),
        dest = %dest.display(),
        entries = zip.len(),
        "Extracting archive"
    );

    let mut summary = ExtractSummary::default();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| {
            SrError::archive(format!("Failed to read entry {} of {}: {}", index, archive.display(), e))
        })?;

        let relative = entry.enclosed_name().ok_or_else(|| {
            SrError::archive(format!(
                "Refusing entry '{}' of {}: path escapes the destination",
                entry.name(),
                archive.display()
            ))
        })?;
        let target = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if target.exists() {
            debug!(path = %target.display(), "Already extracted, skipping");
            summary.skipped.push(target);
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let partial = partial_path(&target);
        let written = write_entry(&mut entry, &partial).map_err(|e| {
            let _ = fs::remove_file(&partial);
            match e.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => SrError::archive(format!(
                    "Corrupt entry '{}' in {}: {}",
                    entry.name(),
                    archive.display(),
                    e
                )),
                _ => SrError::Io(e),
            }
        })?;
        fs::rename(&partial, &target)?;

        debug!(path = %target.display(), bytes = written, "Extracted");
        summary.extracted.push(target);
    }

    info!(
        extracted = summary.extracted.len(),
        skipped = summary.skipped.len(),
        "Extraction finished"
    );
    Ok(summary)
}

fn write_entry(entry: &mut impl io::Read, path: &Path) -> io::Result<u64> {
    let mut out = BufWriter::new(File::create(path)?);
    let written = io::copy(entry, &mut out)?;
    out.flush()?;
    Ok(written)
}
