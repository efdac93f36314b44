//! `sr-import status`

use colored::Colorize;
use sr_common::{Result, SrError};

use super::build_updater;
use crate::GlobalArgs;

/// Show stored record counts and the local release files
pub async fn run(args: &GlobalArgs, json: bool) -> Result<()> {
    let updater = build_updater(args, false).await?;
    let counts = updater.status().await?;

    if json {
        let output = serde_json::to_string_pretty(&counts)
            .map_err(|e| SrError::Other(anyhow::anyhow!("Failed to serialize status: {}", e)))?;
        println!("{}", output);
        return Ok(());
    }

    let selection = updater.selection();
    println!("{}", "Release:".cyan().bold());
    println!("  SR{} ({})", selection.release, selection.archive_kind);
    println!(
        "  Archive:   {} {}",
        selection.local_archive_file.display(),
        presence(selection.local_archive_file.exists())
    );
    println!(
        "  Extracted: {} {}",
        selection.local_extract_dir.display(),
        presence(selection.local_extract_dir.exists())
    );
    println!();

    println!("{}", "Database:".cyan().bold());
    println!("  {}", args.database.display());
    for count in &counts {
        println!("  {:<20} {:>8}", count.entity_id, count.records);
    }
    println!(
        "  {:<20} {:>8}",
        "Total".bold(),
        counts.iter().map(|c| c.records).sum::<u64>()
    );
    Ok(())
}

fn presence(exists: bool) -> colored::ColoredString {
    if exists {
        "(present)".green()
    } else {
        "(missing)".dimmed()
    }
}
