//! chitrapost server binary

use anyhow::Result;
use chitrapost_cli::commands::{CheckConfigCommand, MigrateCommand, ServeCommand};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chitrapost")]
#[command(version)]
#[command(about = "Account, token and image upload service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Configuration file (defaults to the standard locations)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Use in-memory stores instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Apply database migrations
    Migrate {
        /// Configuration file (defaults to the standard locations)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Validate configuration and print it with secrets redacted
    CheckConfig {
        /// Configuration file (defaults to the standard locations)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, in_memory } => {
            ServeCommand::new(config, in_memory).execute().await?;
        }
        Commands::Migrate { config } => {
            MigrateCommand::new(config).execute().await?;
        }
        Commands::CheckConfig { config } => {
            CheckConfigCommand::new(config).execute()?;
        }
    }

    Ok(())
}
