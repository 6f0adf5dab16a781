use anyhow::{bail, Result};
use std::path::Path;

use concrete_strength::inference::artifact::{load_model, load_scaler};
use concrete_strength::inference::{Feature, RegressionPredictor};

/// Checks a scaler/model pair the same way the service does at startup and
/// prints what was found.
fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() != 2 {
        bail!("usage: artifact_info <scaler> <model>");
    }

    let scaler = load_scaler(Path::new(&args[0]))?;
    println!("Scaler: {}", args[0]);
    for feature in Feature::ALL {
        let i = feature.index();
        println!(
            "  {:<18} offset {:>10.4}  scale {:>10.4}",
            feature.key(),
            scaler.offsets()[i],
            scaler.scales()[i]
        );
    }

    let model = load_model(Path::new(&args[1]))?;
    println!(
        "Model: {} ({} inputs, kind {})",
        args[1],
        model.n_features(),
        model.kind()
    );
    Ok(())
}
