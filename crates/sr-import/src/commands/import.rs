//! `sr-import import` and `sr-import update`

use colored::Colorize;
use sr_common::Result;

use super::build_updater;
use crate::fetch::DownloadProgress;
use crate::importer::{ImportProgress, ImportSummary};
use crate::progress::{create_download_progress, update_download, ImportProgressBars};
use crate::GlobalArgs;

/// Import the extracted files of the selected release
pub async fn run(args: &GlobalArgs, dry_run: bool) -> Result<()> {
    let updater = build_updater(args, dry_run).await?;
    print_header("Importing", &updater, dry_run);

    let bars = ImportProgressBars::new();
    let on_progress = |p: &ImportProgress| bars.update(p);
    let result = updater.import(Some(&on_progress)).await;
    bars.finish();

    print_summary(&result?, dry_run);
    Ok(())
}

/// Download, extract and import the selected release
pub async fn update(args: &GlobalArgs, dry_run: bool) -> Result<()> {
    let updater = build_updater(args, dry_run).await?;
    print_header("Updating from", &updater, dry_run);

    let pb = create_download_progress(&updater.selection().file_name);
    let on_download = |p: DownloadProgress| update_download(&pb, p);
    let downloaded = updater.download(Some(&on_download)).await;
    pb.finish_and_clear();
    let archive = downloaded?;
    println!("{} Downloaded {}", "✓".green(), archive.display());

    let extract = updater.extract().await?;
    println!(
        "{} Extracted {} file(s), {} already present",
        "✓".green(),
        extract.extracted.len(),
        extract.skipped.len()
    );

    let bars = ImportProgressBars::new();
    let on_progress = |p: &ImportProgress| bars.update(p);
    let result = updater.import(Some(&on_progress)).await;
    bars.finish();

    print_summary(&result?, dry_run);
    Ok(())
}

fn print_header(action: &str, updater: &crate::Updater, dry_run: bool) {
    let selection = updater.selection();
    println!(
        "{}",
        format!("{} SR{} ({})", action, selection.release, selection.archive_kind)
            .cyan()
            .bold()
    );
    if dry_run {
        println!("{}", "Dry run: nothing will be written to the database".yellow());
    }
    println!();
}

fn print_summary(summary: &ImportSummary, dry_run: bool) {
    println!();
    for report in &summary.entities {
        println!(
            "{} {:<20} {:>8} records in {} batch(es)",
            "✓".green(),
            report.entity_id,
            report.records,
            report.batches
        );
    }
    for skipped in &summary.skipped {
        println!("{} {:<20} not a known entity, skipped", "-".yellow(), skipped);
    }

    println!();
    let verb = if dry_run { "Parsed" } else { "Imported" };
    println!(
        "{} {} records across {} entities",
        verb,
        summary.total_records(),
        summary.entities.len()
    );
}
