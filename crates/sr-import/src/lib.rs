//! SR Import
//!
//! Keeps a local nutrition database in step with the USDA National Nutrient
//! Database for Standard Reference (SR).
//!
//! # Overview
//!
//! - **Download**: fetch the full or update archive of a release ([`fetch`])
//! - **Extract**: expand it next to the archive, skipping files already there ([`extract`])
//! - **Import**: stream each mapped flat file into storage in batches ([`importer`])
//! - **Maintenance**: delete stored records, remove local files, count records ([`maintenance`])
//!
//! [`updater::Updater`] ties these together; the `sr-import` binary exposes
//! them as subcommands.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sr_import::config::UpdaterConfig;
//! use sr_import::mapping::MappingCatalog;
//! use sr_import::storage::SqliteStore;
//! use sr_import::updater::Updater;
//!
//! # async fn run() -> sr_common::Result<()> {
//! let store = SqliteStore::open("data/sr.db").await?;
//! store.apply_schema().await?;
//!
//! let config = UpdaterConfig::from_env()?.with_release("28");
//! let updater = Updater::new(config, MappingCatalog::bundled()?, Arc::new(store))?;
//!
//! let report = updater.update(None, None).await?;
//! println!("{} records imported", report.import.total_records());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod config;
pub mod entity;
pub mod extract;
pub mod fetch;
pub mod importer;
pub mod maintenance;
pub mod mapping;
pub mod parser;
pub mod progress;
pub mod storage;
pub mod updater;

pub use config::{ArchiveKind, ReleaseSelection, UpdaterConfig};
pub use importer::{ImportProgress, ImportSummary, Importer};
pub use mapping::{MappingCatalog, MappingEntry};
pub use updater::Updater;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sr-import - USDA Standard Reference database updater
#[derive(Parser, Debug)]
#[command(name = "sr-import")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SR release number, e.g. 28
    #[arg(long, env = "SR_RELEASE", global = true)]
    pub release: Option<String>,

    /// Archive to use: full or update
    #[arg(long, env = "SR_ARCHIVE_KIND", global = true)]
    pub kind: Option<ArchiveKind>,

    /// Directory holding the archive and its extracted files
    #[arg(long, env = "SR_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "SR_DATABASE", default_value = "data/sr.db", global = true)]
    pub database: PathBuf,

    /// Mapping file (defaults to the bundled SR mapping)
    #[arg(long, env = "SR_MAPPING", global = true)]
    pub mapping: Option<PathBuf>,

    /// Records per bulk insert
    #[arg(long, env = "SR_CHUNK_SIZE", global = true)]
    pub chunk_size: Option<usize>,

    /// Entities imported concurrently
    #[arg(long, env = "SR_PARALLELISM", global = true)]
    pub parallelism: Option<usize>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the release archive
    Download,

    /// Extract the downloaded archive (existing files are kept)
    Extract,

    /// Import extracted files into the database
    Import {
        /// Parse and batch everything, but keep records in memory
        #[arg(long)]
        dry_run: bool,
    },

    /// Download, extract and import
    Update {
        /// Parse and batch everything, but keep records in memory
        #[arg(long)]
        dry_run: bool,
    },

    /// Delete all imported records
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove the downloaded archive and extracted files
    Clean,

    /// Show record counts per entity
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sr-import",
            "import",
            "--dry-run",
            "--release",
            "28",
            "--kind",
            "full",
            "--chunk-size",
            "500",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Import { dry_run: true }));
        assert_eq!(cli.global.release.as_deref(), Some("28"));
        assert_eq!(cli.global.kind, Some(ArchiveKind::Full));
        assert_eq!(cli.global.chunk_size, Some(500));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["sr-import", "download", "--kind", "weekly"]).is_err());
    }
}
