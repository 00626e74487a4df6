//! fairprice CLI binary

mod commands;
mod input;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Cli, Commands, OutputFormat};
use fairprice_core::{slugify, Config};
use input::RequestFile;
use report::TextReport;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { input, config, format } => {
            let config = match config {
                Some(path) => Config::from_json_file(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => Config::default(),
            };

            let file = RequestFile::load(&input)?;
            let request = file.request();
            tracing::info!(
                commodity = %request.commodity,
                samples = file.samples.len(),
                "checking quote"
            );

            let service = file.into_service(&config);
            let report = service.check(&request).await.context("price check failed")?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => print!("{}", TextReport(&report)),
            }
        }

        Commands::Slug { name } => {
            println!("{}", slugify(&name));
        }
    }

    Ok(())
}
