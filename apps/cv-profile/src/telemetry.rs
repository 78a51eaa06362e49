use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::UploadConfig;

/// Installs the global tracing subscriber with the filter from `config.rust_log`
/// (`UploadConfig::from_env` fills it from `RUST_LOG`).
///
/// Fails instead of panicking if the filter does not parse or the host already installed a
/// subscriber.
pub fn init_tracing(config: &UploadConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.rust_log)
        .with_context(|| format!("invalid log filter {:?}", config.rust_log))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}
