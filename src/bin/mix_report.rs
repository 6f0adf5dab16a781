//! Offline mix documentation.
//!
//! Usage: mix_report <mix.json> [out_dir]
//!
//! `mix.json` has the same shape as a `/v1/mix/report` request body. Writes
//! `<MIX-ID>.html` and `<MIX-ID>.png` into `out_dir` (default: current dir).

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use concrete_strength::config::ServiceConfig;
use concrete_strength::server::MixRequest;
use concrete_strength::telemetry::init_tracing;
use concrete_strength::{CompactCodeEncoder, InferenceService, ReportRenderer};

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: mix_report <mix.json> [out_dir]");
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    let config = ServiceConfig::from_env()?;
    let service = InferenceService::load(&config.scaler_path, &config.model_path)
        .context("Failed to load model artifacts")?;

    let raw = std::fs::read_to_string(&input).with_context(|| format!("Failed to read {}", input))?;
    let mix: MixRequest =
        serde_json::from_str(&raw).with_context(|| format!("Invalid mix file {}", input))?;

    let record = mix.into_record(&service)?;

    std::fs::create_dir_all(&out_dir).context("Failed to create output directory")?;
    let id = record.identifier();
    let renderer = ReportRenderer::new();

    let html = match CompactCodeEncoder::new().encode(&record) {
        Ok(code) => {
            let png_path = out_dir.join(format!("{}.png", id));
            code.save_png(&png_path)?;
            info!("Code written: {}", png_path.display());
            renderer.render_with_code(&record, &code)
        }
        Err(e) => {
            warn!("No code for {}: {}", id, e);
            renderer.render(&record)
        }
    };

    let html_path = out_dir.join(format!("{}.html", id));
    std::fs::write(&html_path, html)
        .with_context(|| format!("Failed to write {}", html_path.display()))?;
    info!("Report written: {}", html_path.display());

    println!(
        "{}: {} at {} days -> {}",
        record.name,
        record.formatted_strength(),
        record.age_days(),
        html_path.display()
    );
    Ok(())
}
