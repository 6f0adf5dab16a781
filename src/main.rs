//! Concrete Strength Service
//!
//! Loads the fitted scaler and model once, then serves predictions, mix
//! reports and scannable codes over HTTP.

use anyhow::{Context, Result};
use tracing::info;

use concrete_strength::config::ServiceConfig;
use concrete_strength::server::run_server;
use concrete_strength::telemetry::init_tracing;
use concrete_strength::InferenceService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    init_tracing();

    let config = ServiceConfig::from_env()?;
    info!(
        "Loading artifacts (scaler: {}, model: {})",
        config.scaler_path.display(),
        config.model_path.display()
    );

    // Without both artifacts the service must not accept requests.
    let service = InferenceService::load(&config.scaler_path, &config.model_path)
        .context("Failed to load model artifacts")?;

    run_server(config, service).await
}
