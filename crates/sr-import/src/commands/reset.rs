//! `sr-import reset`

use colored::Colorize;
use sr_common::Result;
use std::io::{self, Write};

use super::build_updater;
use crate::GlobalArgs;

/// Delete every imported record of the mapped entities
pub async fn run(args: &GlobalArgs, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            format!(
                "This will delete all imported records from {}.",
                args.database.display()
            )
            .yellow()
        );
        print!("Continue? [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        if input != "y" && input != "yes" {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    let updater = build_updater(args, false).await?;
    let summary = updater.reset().await?;

    for (entity, deleted) in &summary.deleted {
        println!("  {:<20} {:>8} deleted", entity, deleted);
    }
    println!("{} Deleted {} record(s)", "✓".green(), summary.total());
    Ok(())
}
