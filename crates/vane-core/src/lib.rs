//! Application plumbing for Vane: configuration and logging bootstrap.

pub mod config;

pub use config::{Config, ConnectivityConfig, ValidationResult, WeatherConfig};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Vane core initialized");
    Ok(())
}
