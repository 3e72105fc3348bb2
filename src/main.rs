//! GridSQL entrypoint
//!
//! The heavy lifting (catalog bootstrap, query execution) lives in
//! dedicated modules so this file remains a thin orchestrator.

mod config;
mod lifecycle;
mod logging;

use std::env;

use anyhow::Result;
use log::info;

use config::ServerConfig;
use lifecycle::{bootstrap, run};

#[tokio::main]
async fn main() -> Result<()> {
    // Remaining arguments are SQL statements; with none, a stdin REPL runs.
    let statements: Vec<String> = env::args().skip(1).collect();

    let config_path =
        env::var("GRIDSQL_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = match ServerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration from {config_path}: {e:#}");
            std::process::exit(1);
        }
    };

    // Logging before any other side effects.
    logging::init_logging(
        &config.logging.level,
        logging::LogFormat::from_str(&config.logging.format),
    )?;

    info!("gridsql v{}", env!("CARGO_PKG_VERSION"));
    info!("upstream: {}", config.upstream.api_url);

    let app = bootstrap(&config).await?;
    run(&app, &statements).await
}
