//! HTTP server binary for notify-prefs.
//!
//! Usage: `notify-prefs-server [CONFIG.toml]`. Without an argument the
//! `NOTIFY_PREFS_CONFIG` environment variable is consulted, then the default
//! config path; built-in defaults apply when no file exists.

use notify_prefs::{NotifyService, ServiceConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("notify_prefs=info")),
        )
        .init();

    let config = load_config()?;
    let service = NotifyService::start(&config).await?;
    info!("notify-prefs ready on port {}", service.port());

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, draining notification queue");
    service.shutdown().await;
    Ok(())
}

fn load_config() -> anyhow::Result<ServiceConfig> {
    let explicit = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("NOTIFY_PREFS_CONFIG"))
        .map(PathBuf::from);

    if let Some(path) = explicit {
        info!("loading config from {}", path.display());
        return ServiceConfig::from_file(&path)
            .map_err(|e| anyhow::anyhow!("failed to load {}: {e}", path.display()));
    }

    let default_path = ServiceConfig::default_config_path();
    if default_path.exists() {
        info!("loading config from {}", default_path.display());
        return Ok(ServiceConfig::from_file(&default_path)?);
    }

    info!("no config file found, using defaults");
    Ok(ServiceConfig::default())
}
