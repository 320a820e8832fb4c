pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-import")]
#[command(about = "Catalog import - run product rows through the import observers")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Import a JSON array of rows into an in-memory store")]
    Run {
        #[arg(help = "JSON file holding an array of row objects")]
        rows: PathBuf,
        #[arg(long, help = "Import profile (YAML)")]
        profile: Option<PathBuf>,
        #[arg(long, help = "JSON array of products already in the store")]
        existing: Option<PathBuf>,
    },

    #[command(about = "Print the effective import profile")]
    Profile {
        #[arg(long, help = "Import profile (YAML)")]
        profile: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Run { rows, profile, existing } => {
            commands::run::handle(commands::run::RunArgs { rows, profile, existing }, output_format).await
        }
        Commands::Profile { profile } => commands::profile::handle(profile, output_format).await,
    }
}
