use std::path::PathBuf;

use anyhow::Context;

use crate::cli::OutputFormat;
use crate::config::config;

pub async fn handle(profile: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    let profile = config()
        .import_profile(profile.as_deref())
        .context("Failed to resolve import profile")?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Text => print!("{}", profile.to_yaml()?),
    }
    Ok(())
}
