//! Driver binary for the Tradenet simulation.
//!
//! Wires the library crates together: loads configuration, reads the
//! network files, runs the configured batch, and writes JSON reports.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (path from the first argument, else
//!    `tradenet-config.yaml`; defaults when the file is absent)
//! 2. Initialize structured logging (tracing)
//! 3. Load the transport graph and, if configured, the customs graph
//! 4. Run `runs.count` simulations
//! 5. Write per-run reports and cross-run averages

mod error;
mod output;

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tradenet_core::config::{LogFormat, LoggingConfig, SimulationConfig};
use tradenet_core::runner;
use tradenet_world::{TradeGraph, load_edge_list};

use crate::error::EngineError;

/// Config file used when no path is given on the command line.
const DEFAULT_CONFIG_PATH: &str = "tradenet-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, network loading, a run, or report
/// output fails.
fn main() -> Result<(), EngineError> {
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    init_logging(&config.logging)?;
    info!("tradenet-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        seed = config.world.seed,
        runs = config.runs.count,
        max_steps = config.runs.max_steps,
        policy = ?config.movement.policy,
        rule = ?config.pairing.rule,
        "Simulation parameters"
    );

    let (transport, customs) = load_graphs(&config)?;
    if let Some(customs) = &customs {
        info!(
            nodes = customs.node_count(),
            edges = customs.edge_count(),
            "Customs graph loaded, private-aware pairing available"
        );
    }

    let batch = runner::run_batch(&config, &transport, customs.as_ref())?;
    let written = output::write_batch(&config.output.directory, &batch)?;

    info!(
        runs = batch.reports.len(),
        files = written.len(),
        "tradenet-engine finished"
    );
    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| EngineError::Logging {
            message: format!("invalid log level {:?}: {e}", config.level),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match config.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

/// Load the transport graph and the optional customs graph.
fn load_graphs(
    config: &SimulationConfig,
) -> Result<(TradeGraph, Option<TradeGraph>), EngineError> {
    let transport = load_edge_list(&config.world.transport_graph)?;
    info!(
        path = %config.world.transport_graph.display(),
        nodes = transport.node_count(),
        edges = transport.edge_count(),
        "Transport graph loaded"
    );
    if !transport.is_connected() {
        warn!(
            path = %config.world.transport_graph.display(),
            "Transport graph is not connected; some agents can never meet"
        );
    }

    let customs = config
        .world
        .customs_graph
        .as_deref()
        .map(load_edge_list)
        .transpose()?;
    Ok((transport, customs))
}
