//! Microdoppler Classifier - Main Entry Point

use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("=== Microdoppler Classifier v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Model: {} trees, seed {}; history at {}",
        config.model.n_estimators, config.model.seed, config.database.url
    );

    run_server(config).await?;

    Ok(())
}
