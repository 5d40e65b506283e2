//! Watch mode command.

use anyhow::Result;
use meridian_server::DevServer;

use crate::config::ConfigFile;

/// Run watch mode with the preview server.
pub async fn run(site: ConfigFile) -> Result<()> {
    let config = site.dev_config();
    tracing::info!("Starting development server on port {}", config.port);

    DevServer::new(config).start().await?;

    Ok(())
}
