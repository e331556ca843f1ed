//! Configuration loading and typed config structures for Tradenet.
//!
//! The canonical configuration lives in `tradenet-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field is optional in YAML; missing fields take the defaults below.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tradenet_agents::{DEFAULT_COUNTER_OFFER_SAMPLE, DEFAULT_NEIGHBOR_SAMPLE, MovementPolicy};
use tradenet_types::NodeId;
use tradenet_world::{RegionCatalog, RegionSpec, default_node_regions, default_region_specs};

use crate::pairing::{DEFAULT_AGENT_SAMPLE, PairCosts, PairingRule};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `tradenet-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Seed and network files.
    #[serde(default)]
    pub world: WorldConfig,

    /// Who lives where, and what they start with.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Movement rule.
    #[serde(default)]
    pub movement: MovementConfig,

    /// Pairing rule and transaction costs.
    #[serde(default)]
    pub pairing: PairingConfig,

    /// Trade execution parameters.
    #[serde(default)]
    pub trade: TradeConfig,

    /// Number and length of runs.
    #[serde(default)]
    pub runs: RunsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where reports are written.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.movement.neighbor_sample_size == 0 {
            return Err(invalid("movement.neighbor_sample_size must be at least 1"));
        }
        if self.pairing.agent_sample_size < 2 {
            return Err(invalid("pairing.agent_sample_size must be at least 2"));
        }
        if self.trade.counter_offer_sample_size == 0 {
            return Err(invalid("trade.counter_offer_sample_size must be at least 1"));
        }
        if self.runs.count == 0 {
            return Err(invalid("runs.count must be at least 1"));
        }
        if self.population.initial_wealth < Decimal::ZERO {
            return Err(invalid("population.initial_wealth must not be negative"));
        }

        let catalog = self.population.region_catalog()?;
        for (node, type_id) in &self.population.node_regions {
            if catalog.get(*type_id).is_none() {
                return Err(invalid(&format!(
                    "node {node} names unknown region type {type_id}"
                )));
            }
        }
        for (node, count) in &self.population.agents_per_node {
            if *count > 0 && !self.population.node_regions.contains_key(node) {
                return Err(invalid(&format!(
                    "node {node} has {count} agents but no home region"
                )));
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Base random seed. Run `n` seeds its generator with `seed + n`.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Edge-list file of the transport graph.
    #[serde(default = "default_transport_graph")]
    pub transport_graph: PathBuf,

    /// Edge-list file of the customs graph. Without one, customs are off.
    #[serde(default)]
    pub customs_graph: Option<PathBuf>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            transport_graph: default_transport_graph(),
            customs_graph: None,
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Regional agents placed on each node.
    #[serde(default = "default_agents_per_node")]
    pub agents_per_node: BTreeMap<NodeId, u32>,

    /// Starting wealth of every agent.
    #[serde(default = "default_initial_wealth")]
    pub initial_wealth: Decimal,

    /// Single-unit entries each regional agent starts with.
    #[serde(default = "default_goods_per_agent")]
    pub goods_per_agent: u32,

    /// Whether every node also hosts one Private agent.
    #[serde(default = "default_true")]
    pub private_agent_per_node: bool,

    /// Region catalog.
    #[serde(default = "default_region_specs")]
    pub regions: Vec<RegionSpec>,

    /// Home region type id of the agents on each node.
    #[serde(default = "default_node_regions")]
    pub node_regions: BTreeMap<NodeId, u32>,
}

impl PopulationConfig {
    /// Build the validated region catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the region list is unusable.
    pub fn region_catalog(&self) -> Result<RegionCatalog, ConfigError> {
        RegionCatalog::new(self.regions.clone()).map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            agents_per_node: default_agents_per_node(),
            initial_wealth: default_initial_wealth(),
            goods_per_agent: default_goods_per_agent(),
            private_agent_per_node: true,
            regions: default_region_specs(),
            node_regions: default_node_regions(),
        }
    }
}

/// Movement configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MovementConfig {
    /// Destination rule.
    #[serde(default)]
    pub policy: MovementPolicy,

    /// Neighbors considered per decision.
    #[serde(default = "default_neighbor_sample_size")]
    pub neighbor_sample_size: usize,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            policy: MovementPolicy::default(),
            neighbor_sample_size: default_neighbor_sample_size(),
        }
    }
}

/// Pairing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PairingConfig {
    /// Cost rule.
    #[serde(default)]
    pub rule: PairingRule,

    /// Agents drawn per pairing round.
    #[serde(default = "default_agent_sample_size")]
    pub agent_sample_size: usize,

    /// Transaction-cost table.
    #[serde(default)]
    pub costs: PairCosts,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            rule: PairingRule::default(),
            agent_sample_size: default_agent_sample_size(),
            costs: PairCosts::default(),
        }
    }
}

/// Trade configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TradeConfig {
    /// Counter-offer candidates drawn per offered good.
    #[serde(default = "default_counter_offer_sample_size")]
    pub counter_offer_sample_size: usize,

    /// Merge ledger entries of the same kind after every step. Changes
    /// ledger sizes and therefore trade amounts; off by default.
    #[serde(default)]
    pub coalesce_ledgers: bool,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            counter_offer_sample_size: default_counter_offer_sample_size(),
            coalesce_ledgers: false,
        }
    }
}

/// Run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunsConfig {
    /// Number of independent runs.
    #[serde(default = "default_run_count")]
    pub count: u32,

    /// Step cap per run.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Give every agent id the same behavior in every run.
    #[serde(default = "default_true")]
    pub reuse_behaviors: bool,
}

impl Default for RunsConfig {
    fn default() -> Self {
        Self {
            count: default_run_count(),
            max_steps: default_max_steps(),
            reuse_behaviors: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives the report files.
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

fn default_transport_graph() -> PathBuf {
    PathBuf::from("data/transport.csv")
}

fn default_agents_per_node() -> BTreeMap<NodeId, u32> {
    (0..=10_u64).map(|node| (NodeId(node), 10)).collect()
}

fn default_initial_wealth() -> Decimal {
    Decimal::from(500)
}

const fn default_goods_per_agent() -> u32 {
    10
}

const fn default_true() -> bool {
    true
}

const fn default_neighbor_sample_size() -> usize {
    DEFAULT_NEIGHBOR_SAMPLE
}

const fn default_agent_sample_size() -> usize {
    DEFAULT_AGENT_SAMPLE
}

const fn default_counter_offer_sample_size() -> usize {
    DEFAULT_COUNTER_OFFER_SAMPLE
}

const fn default_run_count() -> u32 {
    10
}

const fn default_max_steps() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("runs")
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.population.agents_per_node.len(), 11);
        assert_eq!(config.population.initial_wealth, dec!(500));
        assert_eq!(config.population.regions.len(), 11);
        assert_eq!(config.movement.neighbor_sample_size, 5);
        assert_eq!(config.pairing.agent_sample_size, 5);
        assert_eq!(config.trade.counter_offer_sample_size, 3);
        assert_eq!(config.runs.count, 10);
        assert_eq!(config.runs.max_steps, 1000);
        assert!(!config.trade.coalesce_ledgers);
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = SimulationConfig::parse("{}");
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  seed: 7
  transport_graph: "nets/roman.csv"
  customs_graph: "nets/customs.csv"

population:
  agents_per_node:
    0: 4
    1: 2
  initial_wealth: 250.5
  goods_per_agent: 3
  private_agent_per_node: false
  node_regions:
    0: 0
    1: 4

movement:
  policy: random_walk
  neighbor_sample_size: 2

pairing:
  rule: type_match
  agent_sample_size: 4
  costs:
    different_type: 9

trade:
  counter_offer_sample_size: 1
  coalesce_ledgers: true

runs:
  count: 3
  max_steps: 3000
  reuse_behaviors: false

logging:
  level: debug
  format: json

output:
  directory: "out"
"#;
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.world.seed, 7);
        assert_eq!(
            config.world.customs_graph,
            Some(PathBuf::from("nets/customs.csv"))
        );
        assert_eq!(config.population.agents_per_node.get(&NodeId(0)), Some(&4));
        assert_eq!(config.population.initial_wealth, dec!(250.5));
        assert!(!config.population.private_agent_per_node);
        assert_eq!(config.movement.policy, MovementPolicy::RandomWalk);
        assert_eq!(config.pairing.rule, PairingRule::TypeMatch);
        assert_eq!(config.pairing.costs.different_type, 9);
        assert_eq!(config.pairing.costs.same_type, 1);
        assert!(config.trade.coalesce_ledgers);
        assert_eq!(config.runs.max_steps, 3000);
        assert!(!config.runs.reuse_behaviors);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.output.directory, PathBuf::from("out"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = SimulationConfig::parse("runs: [not, a, map]");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn zero_samples_rejected() {
        let result = SimulationConfig::parse("movement:\n  neighbor_sample_size: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        let result = SimulationConfig::parse("trade:\n  counter_offer_sample_size: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
        let result = SimulationConfig::parse("runs:\n  count: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn unknown_home_region_rejected() {
        let result = SimulationConfig::parse("population:\n  node_regions:\n    0: 99\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn populated_node_needs_a_region() {
        let yaml = "population:\n  agents_per_node:\n    12: 3\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn negative_wealth_rejected() {
        let result = SimulationConfig::parse("population:\n  initial_wealth: -1\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/tradenet-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let yaml = include_str!("../../../tradenet-config.yaml");
        let config = SimulationConfig::parse(yaml);
        assert_eq!(config.ok(), Some(SimulationConfig::default()));
    }
}
