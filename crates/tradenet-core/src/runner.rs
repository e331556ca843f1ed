//! Run orchestration.
//!
//! [`run_to_completion`] steps one simulation until no agent is active or
//! a step cap is reached. [`run_batch`] builds and runs `runs.count`
//! independent simulations from one configuration. Run `n` seeds its own
//! generator with `seed + n`, and when behavior reuse is on, each run
//! inherits the behavior map accumulated by the runs before it, so an
//! agent id keeps its behavior across the whole batch.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tradenet_agents::BehaviorMap;
use tradenet_world::TradeGraph;

use crate::config::SimulationConfig;
use crate::population::{PopulationError, PopulationPlan, populate};
use crate::report::RunReport;
use crate::simulation::{Simulation, SimulationSettings, StepError, StepSummary};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step failed.
    #[error("step error: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },

    /// The population could not be built.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: PopulationError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEndReason {
    /// No agent was active any more.
    AllInactive,
    /// The step cap was reached with agents still active.
    StepCap,
}

/// Result of [`run_to_completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
    /// Steps executed by this call.
    pub steps: u64,
    /// Summary of the last step, if any ran.
    pub final_summary: Option<StepSummary>,
}

/// Step `sim` until no agent is active or `max_steps` steps have run.
///
/// The active check comes first, so a simulation with no active agents
/// runs zero steps.
///
/// # Errors
///
/// Returns [`RunnerError::Step`] if a step fails.
pub fn run_to_completion<R: Rng>(
    sim: &mut Simulation<R>,
    max_steps: u64,
) -> Result<RunResult, RunnerError> {
    let mut steps: u64 = 0;
    let mut final_summary: Option<StepSummary> = None;

    loop {
        if sim.active_count() == 0 {
            return Ok(RunResult {
                end_reason: SimulationEndReason::AllInactive,
                steps,
                final_summary,
            });
        }
        if steps >= max_steps {
            return Ok(RunResult {
                end_reason: SimulationEndReason::StepCap,
                steps,
                final_summary,
            });
        }
        final_summary = Some(sim.step()?);
        steps = steps.saturating_add(1);
    }
}

/// Build the simulation for run `run` (1-based).
///
/// # Errors
///
/// Returns [`RunnerError::Population`] if the population cannot be placed.
pub fn build_simulation(
    config: &SimulationConfig,
    transport: &TradeGraph,
    customs: Option<&TradeGraph>,
    run: u32,
    reuse: Option<&BehaviorMap>,
) -> Result<Simulation<StdRng>, RunnerError> {
    let seed = config.world.seed.wrapping_add(u64::from(run));
    let settings = SimulationSettings::from_config(config, customs.is_some());
    let mut sim = Simulation::new(
        transport.clone(),
        customs.cloned(),
        settings,
        StdRng::seed_from_u64(seed),
    );
    let plan = PopulationPlan::from_config(&config.population)?;
    populate(&mut sim, &plan, reuse)?;
    Ok(sim)
}

/// Reports of a whole batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    /// One report per run, in run order.
    pub reports: Vec<RunReport>,
    /// Behaviors the batch ran with: the shared map when reuse is on,
    /// otherwise the first run's assignment.
    pub behaviors: BehaviorMap,
}

/// Run `config.runs.count` independent simulations.
///
/// # Errors
///
/// Returns [`RunnerError`] if any run fails to build or step.
pub fn run_batch(
    config: &SimulationConfig,
    transport: &TradeGraph,
    customs: Option<&TradeGraph>,
) -> Result<BatchResult, RunnerError> {
    let mut reports = Vec::new();
    let mut behaviors = BehaviorMap::new();

    for run in 1..=config.runs.count {
        let reuse = (config.runs.reuse_behaviors && !behaviors.is_empty()).then_some(&behaviors);
        let mut sim = build_simulation(config, transport, customs, run, reuse)?;
        sim.log_population();
        info!(run, agents = sim.agents().len(), "Run starting");

        let result = run_to_completion(&mut sim, config.runs.max_steps)?;
        log_run_end(run, &result);

        reports.push(RunReport::new(
            run,
            result.steps,
            result.end_reason,
            sim.reports(),
        ));

        let run_behaviors = sim.into_behaviors();
        if config.runs.reuse_behaviors {
            behaviors.extend(run_behaviors);
        } else if run == 1 {
            behaviors = run_behaviors;
        }
    }

    info!(runs = reports.len(), "All runs completed");
    Ok(BatchResult { reports, behaviors })
}

/// Log how a run ended.
pub fn log_run_end(run: u32, result: &RunResult) {
    let active_agents = result.final_summary.as_ref().map(|s| s.active_agents);
    match result.end_reason {
        SimulationEndReason::AllInactive => info!(
            run,
            steps = result.steps,
            "Run ended: no active agents"
        ),
        SimulationEndReason::StepCap => warn!(
            run,
            steps = result.steps,
            active_agents,
            "Run ended: step cap reached"
        ),
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects, clippy::panic)]
mod tests {
    use rand::rngs::SmallRng;
    use rust_decimal_macros::dec;
    use tradenet_types::NodeId;

    use super::*;

    fn ring(nodes: u64, weight: rust_decimal::Decimal) -> TradeGraph {
        let mut graph = TradeGraph::new();
        for id in 0..nodes {
            graph.ensure_node(NodeId(id));
        }
        for id in 0..nodes {
            let _ = graph.add_edge(NodeId(id), NodeId((id + 1) % nodes), weight);
        }
        graph
    }

    fn small_config() -> SimulationConfig {
        let yaml = r"
population:
  agents_per_node:
    0: 3
    1: 3
    2: 3
runs:
  count: 3
  max_steps: 50
";
        SimulationConfig::parse(yaml).unwrap_or_default()
    }

    #[test]
    fn empty_simulation_ends_immediately() {
        let mut sim = Simulation::new(
            ring(3, dec!(1)),
            None,
            SimulationSettings::default(),
            SmallRng::seed_from_u64(42),
        );
        let result = run_to_completion(&mut sim, 10);
        assert!(matches!(
            result,
            Ok(RunResult {
                end_reason: SimulationEndReason::AllInactive,
                steps: 0,
                final_summary: None,
            })
        ));
    }

    #[test]
    fn step_cap_is_honored() {
        let config = small_config();
        let transport = ring(3, dec!(1));
        let sim = build_simulation(&config, &transport, None, 1, None);
        assert!(sim.is_ok());
        let Ok(mut sim) = sim else { return };

        let result = run_to_completion(&mut sim, 5);
        assert!(matches!(
            result,
            Ok(RunResult {
                end_reason: SimulationEndReason::StepCap,
                steps: 5,
                ..
            })
        ));
        assert_eq!(sim.step_count(), 5);
    }

    #[test]
    fn expensive_world_empties_out() {
        let config = small_config();
        let transport = ring(3, dec!(200));
        let Ok(mut sim) = build_simulation(&config, &transport, None, 1, None) else {
            panic!("simulation should build");
        };
        let result = run_to_completion(&mut sim, 1000);
        assert!(matches!(
            result,
            Ok(RunResult {
                end_reason: SimulationEndReason::AllInactive,
                ..
            })
        ));
        assert_eq!(sim.active_count(), 0);
    }

    #[test]
    fn batch_reuses_behaviors() {
        let config = small_config();
        let transport = ring(3, dec!(1));
        let batch = run_batch(&config, &transport, None);
        assert!(batch.is_ok());
        let Ok(batch) = batch else { return };

        assert_eq!(batch.reports.len(), 3);
        // 9 regional agents plus one Private agent on each of 3 nodes.
        assert_eq!(batch.behaviors.len(), 12);
        for report in &batch.reports {
            assert_eq!(report.agents.len(), 12);
            for row in &report.agents {
                assert_eq!(batch.behaviors.get(&row.agent_id), Some(&row.behavior));
            }
        }
    }

    #[test]
    fn runs_differ_by_seed() {
        let config = small_config();
        let transport = ring(3, dec!(1));
        let first = build_simulation(&config, &transport, None, 1, None);
        let second = build_simulation(&config, &transport, None, 2, None);
        let (Ok(mut first), Ok(mut second)) = (first, second) else {
            panic!("simulations should build");
        };
        let _ = run_to_completion(&mut first, 20);
        let _ = run_to_completion(&mut second, 20);
        assert_ne!(first.reports(), second.reports());
    }

    #[test]
    fn same_seed_same_outcome() {
        let config = small_config();
        let transport = ring(3, dec!(1));
        let first = build_simulation(&config, &transport, None, 1, None);
        let second = build_simulation(&config, &transport, None, 1, None);
        let (Ok(mut first), Ok(mut second)) = (first, second) else {
            panic!("simulations should build");
        };
        let _ = run_to_completion(&mut first, 20);
        let _ = run_to_completion(&mut second, 20);
        assert_eq!(first.reports(), second.reports());
    }
}
