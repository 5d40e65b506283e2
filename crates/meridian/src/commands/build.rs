//! Production build command.

use anyhow::{Context, Result};
use meridian_static::StaticBuilder;

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(site: ConfigFile) -> Result<()> {
    tracing::info!("Building static site...");

    let config = site.build_config();
    let builder = StaticBuilder::new(config);

    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .context("Build task panicked")?
        .context("Build failed")?;

    for (region, page) in &result.pages.skipped {
        tracing::debug!("Skipped {}/{}.html (no source)", region.slug(), page);
    }

    tracing::info!(
        "Built {} pages and {} assets, copied {} files in {}ms",
        result.pages.emitted.len(),
        result.assets.len(),
        result.copied,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
