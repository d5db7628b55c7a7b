//! Aperture - local HTTP bridge between a photo editor and local LLM
//! backends (LM Studio, Ollama).
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (LM Studio on :1234, Ollama on :11434)
//! aperture
//!
//! # Bind elsewhere and default to Ollama
//! aperture --port 9090 --provider ollama
//!
//! # Point at a specific config file
//! aperture --config ./bridge.toml
//! ```

use aperture_core::BridgeConfig;
use clap::Parser;
use std::path::PathBuf;

mod logging;
mod server;

/// Aperture - local bridge to LM Studio and Ollama for vision workflows.
#[derive(Parser, Debug)]
#[command(name = "aperture")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host/IP address to bind (default: config or 127.0.0.1)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (default: config or 8082)
    #[arg(short, long)]
    port: Option<u16>,

    /// Default provider used when requests do not specify one
    #[arg(long, value_parser = ["lmstudio", "ollama"])]
    provider: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, env = "APERTURE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config problems are startup-fatal: refuse to serve on them.
    let mut config = BridgeConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(provider) = cli.provider {
        config.default_provider = provider;
    }
    config.validate()?;

    logging::init_from_config(&config, cli.verbose, cli.json_logs);
    tracing::info!(
        "Aperture v{} on {}:{} (default provider: {})",
        aperture_core::VERSION,
        config.host,
        config.port,
        config.default_provider
    );

    server::serve(config).await
}
