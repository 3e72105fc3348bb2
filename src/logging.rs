// Logging module — powered by tracing-subscriber
//
// The library crates log through the `log` macros; a compatibility bridge
// (`tracing_log::LogTracer`) routes those events through the tracing
// subscriber so one filter and one formatter govern everything.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log format type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text format: timestamp LEVEL target - message
    Compact,
    /// JSON Lines format for structured logging
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Build the `EnvFilter` from the base level plus hardcoded noisy-crate
/// overrides.
fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let mut directives = vec![level.to_string()];

    // Suppress noisy third-party crates
    let noisy: &[(&str, &str)] = &[
        ("datafusion", "warn"),
        ("reqwest", "warn"),
        ("hyper", "warn"),
        ("h2", "warn"),
        ("rustls", "warn"),
    ];
    for (target, target_level) in noisy {
        directives.push(format!("{}={}", target, target_level));
    }

    EnvFilter::try_new(directives.join(","))
        .map_err(|e| anyhow::anyhow!("invalid log filter: {}", e))
}

/// Initialize logging for the process. Call once, before any other side
/// effects.
pub fn init_logging(level: &str, format: LogFormat) -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;

    let filter = build_env_filter(level)?;
    match format {
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }
    Ok(())
}
