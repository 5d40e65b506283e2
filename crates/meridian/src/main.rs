//! Meridian CLI - multi-region static site generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "meridian")]
#[command(about = "Build one static site per region from a shared set of pages")]
#[command(version)]
pub struct Cli {
    /// Run a one-shot production build instead of watch mode
    #[arg(long)]
    build: bool,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let site = config::load(&cli.config)?;

    if cli.build {
        commands::build::run(site).await?;
    } else {
        commands::dev::run(site).await?;
    }

    Ok(())
}
