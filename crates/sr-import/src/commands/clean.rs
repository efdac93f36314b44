//! `sr-import clean`

use colored::Colorize;
use sr_common::Result;

use super::build_offline_updater;
use crate::GlobalArgs;

/// Remove the downloaded archive and the extraction directory
pub async fn run(args: &GlobalArgs) -> Result<()> {
    let updater = build_offline_updater(args)?;
    let summary = updater.clean()?;

    match (&summary.removed_archive, &summary.removed_extract_dir) {
        (None, None) => println!("Nothing to clean."),
        (archive, dir) => {
            if let Some(path) = archive {
                println!("{} Removed {}", "✓".green(), path.display());
            }
            if let Some(path) = dir {
                println!("{} Removed {}", "✓".green(), path.display());
            }
        },
    }
    Ok(())
}
