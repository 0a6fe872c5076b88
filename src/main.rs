//! schmitt-bridge — entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │   MqttTransport     LogEventSink      MonotonicClock     │
//! │   (Publisher)       (EventSink)       (Clock)            │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  Dispatcher: RuleTable · TopicStateStore · FSM     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::EnvFilter;

use schmitt_bridge::adapters::log_sink::LogEventSink;
use schmitt_bridge::adapters::mqtt::MqttTransport;
use schmitt_bridge::adapters::time::MonotonicClock;
use schmitt_bridge::app::service::Dispatcher;
use schmitt_bridge::config::{self, BridgeConfig};
use schmitt_bridge::error::ConfigError;
use schmitt_bridge::rules::RuleTable;
use schmitt_bridge::store::TopicStateStore;

#[derive(Debug, Parser)]
#[command(name = "schmitt-bridge", version)]
#[command(about = "Threshold bridge between MQTT sensor topics and actuator topics")]
struct Cli {
    /// Configuration file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Refuse to start if any rule definition is dropped.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    info!("schmitt-bridge v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ──────────────────────────────────────
    let path = config::resolve_path(cli.config.as_deref())?;
    let config = BridgeConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    info!("Configuration loaded from {}", path.display());

    // ── 2. Rules ──────────────────────────────────────────────
    let rules = RuleTable::build(&config.rules);
    if rules.rejected_count() > 0 {
        if cli.strict {
            return Err(ConfigError::RulesRejected(rules.rejected_count()).into());
        }
        warn!(
            "{} rule definition(s) ignored (empty topic); pass --strict to refuse",
            rules.rejected_count()
        );
    }
    if rules.is_empty() {
        warn!("No active rules; every message will be dropped");
    }
    for rule in rules.iter() {
        info!(
            "Rule {} -> {} (threshold {}, on {} ms, off {} ms, qos {})",
            rule.source_topic,
            rule.destination_topic,
            rule.threshold,
            rule.on_delay_ms,
            rule.off_delay_ms,
            rule.qos
        );
    }

    // ── 3. Transport ──────────────────────────────────────────
    let transport = MqttTransport::new(&config.broker, &rules)?;

    // ── 4. Core ───────────────────────────────────────────────
    let states = match config.state_capacity {
        Some(n) => TopicStateStore::with_capacity_limit(n),
        None => TopicStateStore::new(),
    };
    let mut dispatcher = Dispatcher::new(rules, states, MonotonicClock::new());
    let mut sink = LogEventSink::new();
    dispatcher.start(&mut sink);

    // ── 5. Run ────────────────────────────────────────────────
    transport
        .run(&mut dispatcher, &mut sink)
        .context("failed to connect")?;

    info!(
        "Exiting after {} message(s), {} unroutable",
        dispatcher.message_count(),
        dispatcher.unroutable_count()
    );
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Also installs the `log` bridge, which the library logs through.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
