//! Alert Relay - Main Entry Point

use relay::{init_logging, run, AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&path)?;
    init_logging(&config.logging)?;

    info!("=== Alert Relay v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from {}", path);

    run(config).await
}
