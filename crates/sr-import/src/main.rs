//! sr-import - Main entry point

use clap::Parser;
use sr_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use sr_import::{commands, Cli, Commands};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.global.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("sr-import")
        .build();

    // SR_LOG_* variables take precedence over the flags
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging, so a failed init is ignored
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> sr_common::Result<()> {
    let args = &cli.global;
    match &cli.command {
        Commands::Download => commands::fetch::download(args).await,
        Commands::Extract => commands::fetch::extract(args).await,
        Commands::Import { dry_run } => commands::import::run(args, *dry_run).await,
        Commands::Update { dry_run } => commands::import::update(args, *dry_run).await,
        Commands::Reset { yes } => commands::reset::run(args, *yes).await,
        Commands::Clean => commands::clean::run(args).await,
        Commands::Status { json } => commands::status::run(args, *json).await,
    }
}
