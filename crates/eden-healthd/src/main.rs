//! Eden Registry health daemon
//!
//! Probes the Registry on a fixed interval, classifies its health, and logs
//! status transitions. `--once` runs a single check and prints the status
//! report as JSON.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use eden_healthd::{Daemon, DaemonConfig};
use eden_registry_health::PolicyMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Eden Registry health daemon CLI
#[derive(Parser)]
#[command(name = "eden-healthd")]
#[command(about = "Eden - Registry health monitoring daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "EDEN_HEALTH_CONFIG")]
    config: Option<String>,

    /// Registry base URL
    #[arg(long, env = "EDEN_HEALTH_REGISTRY_URL")]
    registry_url: Option<String>,

    /// Polling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    probe_timeout_ms: Option<u64>,

    /// Fallback policy (strict | permissive)
    #[arg(long)]
    policy: Option<PolicyMode>,

    /// Log level
    #[arg(long, env = "EDEN_HEALTH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json: bool,

    /// Run one check, print the status report, and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        DaemonConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    if let Some(url) = cli.registry_url {
        config.health.registry.url = url;
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.health.monitor.interval_ms = interval_ms;
    }
    if let Some(timeout_ms) = cli.probe_timeout_ms {
        config.health.monitor.probe_timeout_ms = timeout_ms;
    }
    if let Some(mode) = cli.policy {
        config.health.policy = eden_registry_health::EnforcementPolicy::new(
            mode,
            config.health.policy.alert_threshold(),
            config.health.policy.critical_threshold(),
        )?;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;
    config.validate()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let daemon = Daemon::new(config.clone())?;

    if cli.once {
        let (report, code) = daemon.check_once_exit_code().await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::from(code));
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        registry = %config.health.registry.url,
        policy = %config.health.policy.mode(),
        "Starting Eden Registry health daemon"
    );

    daemon.run().await?;
    Ok(ExitCode::SUCCESS)
}
