//! Standalone voicedrop server binary.
//!
//! Usage: `voicedrop-server [config.toml]`. With no argument the built-in
//! defaults apply (SQLite file next to the binary, uploads/ directory,
//! 127.0.0.1:4000). `VOICEDROP_*` environment variables override either.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use voicedrop::server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = ServerConfig::load(path.as_deref())?;

    voicedrop::server::run(config).await
}
