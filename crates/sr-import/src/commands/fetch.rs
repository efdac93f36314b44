//! `sr-import download` and `sr-import extract`

use colored::Colorize;
use sr_common::Result;

use super::build_offline_updater;
use crate::fetch::DownloadProgress;
use crate::progress::{create_download_progress, format_bytes, update_download};
use crate::GlobalArgs;

/// Download the selected release archive
pub async fn download(args: &GlobalArgs) -> Result<()> {
    let updater = build_offline_updater(args)?;
    let selection = updater.selection();

    println!(
        "Downloading SR{} {} archive from {}",
        selection.release,
        selection.archive_kind,
        selection.url.as_str().cyan()
    );

    let pb = create_download_progress(&selection.file_name);
    let on_progress = |p: DownloadProgress| update_download(&pb, p);
    let result = updater.download(Some(&on_progress)).await;
    pb.finish_and_clear();

    let path = result?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    println!(
        "{} Downloaded {} ({})",
        "✓".green(),
        path.display(),
        format_bytes(size)
    );
    Ok(())
}

/// Extract the downloaded archive next to it
pub async fn extract(args: &GlobalArgs) -> Result<()> {
    let updater = build_offline_updater(args)?;
    let summary = updater.extract().await?;

    println!(
        "{} Extracted {} file(s) into {}",
        "✓".green(),
        summary.extracted.len(),
        updater.selection().local_extract_dir.display()
    );
    if !summary.skipped.is_empty() {
        println!(
            "  {} file(s) already present, kept as they are (run 'sr-import clean' to start over)",
            summary.skipped.len()
        );
    }
    Ok(())
}
