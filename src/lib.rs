pub mod core;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core::config::InstallerConfig;
use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::{build_http_client, ReqwestTransport};
use crate::core::pipeline::{InstallPipeline, InstallReport};

/// Install the structured logging subscriber.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,okyanus_installer=debug")),
        )
        .init();
}

/// Run the whole installation in the current directory.
pub async fn run() -> InstallerResult<InstallReport> {
    let work_dir =
        std::env::current_dir().map_err(|e| InstallerError::io(".", e))?;
    let config = InstallerConfig::load(&work_dir)?;

    tracing::info!(
        "Okyanus installer starting for Minecraft {}",
        config.minecraft_version
    );

    let client = build_http_client()?;
    let transport = Arc::new(ReqwestTransport::new(client));

    InstallPipeline::new(config, transport).run().await
}
