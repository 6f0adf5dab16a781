//! Service configuration
//!
//! Read from the environment (a `.env` file is honoured by the binaries).

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_SCALER_PATH: &str = "artifacts/concrete_strength_scaler.bin";
pub const DEFAULT_MODEL_PATH: &str = "artifacts/concrete_strength_model.bin";

/// Origins allowed to call the HTTP surface from a browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: SocketAddr,
    pub scaler_path: PathBuf,
    pub model_path: PathBuf,
    pub cors_origins: CorsOrigins,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind = lookup("CONCRETE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("Invalid CONCRETE_BIND_ADDR: {}", bind))?;

        Ok(Self {
            bind_addr,
            scaler_path: lookup("CONCRETE_SCALER_PATH")
                .unwrap_or_else(|| DEFAULT_SCALER_PATH.to_string())
                .into(),
            model_path: lookup("CONCRETE_MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            cors_origins: CorsOrigins::parse(&lookup("CONCRETE_CORS_ORIGINS").unwrap_or_default()),
        })
    }
}
