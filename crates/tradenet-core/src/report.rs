//! Per-run reports and cross-run averages.
//!
//! A [`RunReport`] captures every agent's final state after one run. Goods
//! are zero-filled so every agent lists every good name seen in that run.
//!
//! Two aggregations are offered over a batch of runs, both simple means:
//!
//! - [`average_by_agent`] groups rows by (agent id, region, behavior,
//!   active flag). The same id can appear in two groups when it ended
//!   active in some runs and inactive in others.
//! - [`average_by_region`] groups rows by region name alone.
//!
//! A good missing from some run's columns counts as zero in the means.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradenet_types::{AgentId, AgentReport, TradeBehavior};

use crate::runner::SimulationEndReason;

/// Errors from report aggregation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A sum or mean overflowed.
    #[error("arithmetic overflow while averaging {context}")]
    ArithmeticOverflow {
        /// What was being averaged.
        context: String,
    },
}

/// Final state of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run number, starting at 1.
    pub run: u32,
    /// Steps executed.
    pub steps: u64,
    /// Why the run stopped.
    pub end_reason: SimulationEndReason,
    /// Every good name held by any agent at the end.
    pub goods: BTreeSet<String>,
    /// Per-agent rows, in ascending id order.
    pub agents: Vec<AgentReport>,
}

impl RunReport {
    /// Build a report, zero-filling each agent's goods to the run's full
    /// set of good names.
    pub fn new(
        run: u32,
        steps: u64,
        end_reason: SimulationEndReason,
        mut agents: Vec<AgentReport>,
    ) -> Self {
        let goods: BTreeSet<String> = agents
            .iter()
            .flat_map(|a| a.goods.keys().cloned())
            .collect();
        for agent in &mut agents {
            for name in &goods {
                agent.goods.entry(name.clone()).or_insert(0);
            }
        }
        Self {
            run,
            steps,
            end_reason,
            goods,
            agents,
        }
    }

    /// Number of agents that ended active.
    pub fn active_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.active).count()
    }
}

/// Mean final state of one agent over the runs where it ended in the same
/// group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAverage {
    /// Agent id.
    pub agent_id: AgentId,
    /// Region name.
    pub region: String,
    /// Assigned behavior.
    pub behavior: TradeBehavior,
    /// Whether the agent ended active.
    pub active: bool,
    /// Rows averaged.
    pub samples: u64,
    /// Mean final wealth.
    pub mean_wealth: Decimal,
    /// Mean final quantity per good name.
    pub mean_goods: BTreeMap<String, Decimal>,
}

/// Mean final state of all agents of one region over all runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionAverage {
    /// Region name.
    pub region: String,
    /// Rows averaged.
    pub samples: u64,
    /// Mean final wealth.
    pub mean_wealth: Decimal,
    /// Mean final quantity per good name.
    pub mean_goods: BTreeMap<String, Decimal>,
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Accumulator {
    samples: u64,
    wealth: Decimal,
    goods: BTreeMap<String, u64>,
}

impl Accumulator {
    fn add(&mut self, row: &AgentReport) -> Result<(), ReportError> {
        self.samples = self.samples.saturating_add(1);
        self.wealth = self
            .wealth
            .checked_add(row.wealth)
            .ok_or_else(|| overflow("wealth"))?;
        for (name, quantity) in &row.goods {
            let total = self.goods.entry(name.clone()).or_insert(0);
            *total = total
                .checked_add(*quantity)
                .ok_or_else(|| overflow(name))?;
        }
        Ok(())
    }

    fn means(
        &self,
        all_goods: &BTreeSet<String>,
    ) -> Result<(Decimal, BTreeMap<String, Decimal>), ReportError> {
        let count = Decimal::from(self.samples.max(1));
        let mean_wealth = self
            .wealth
            .checked_div(count)
            .ok_or_else(|| overflow("wealth"))?;
        let mut mean_goods = BTreeMap::new();
        for name in all_goods {
            let total = Decimal::from(self.goods.get(name).copied().unwrap_or(0));
            let mean = total.checked_div(count).ok_or_else(|| overflow(name))?;
            mean_goods.insert(name.clone(), mean);
        }
        Ok((mean_wealth, mean_goods))
    }
}

fn overflow(context: &str) -> ReportError {
    ReportError::ArithmeticOverflow {
        context: context.to_owned(),
    }
}

fn all_goods(reports: &[RunReport]) -> BTreeSet<String> {
    reports.iter().flat_map(|r| r.goods.iter().cloned()).collect()
}

/// Average agent rows grouped by (id, region, behavior, active).
///
/// # Errors
///
/// Returns [`ReportError::ArithmeticOverflow`] if a sum overflows.
pub fn average_by_agent(reports: &[RunReport]) -> Result<Vec<AgentAverage>, ReportError> {
    let mut groups: BTreeMap<(AgentId, String, TradeBehavior, bool), Accumulator> =
        BTreeMap::new();
    for report in reports {
        for row in &report.agents {
            groups
                .entry((row.agent_id, row.region.clone(), row.behavior, row.active))
                .or_default()
                .add(row)?;
        }
    }

    let goods = all_goods(reports);
    groups
        .into_iter()
        .map(|((agent_id, region, behavior, active), acc)| {
            let (mean_wealth, mean_goods) = acc.means(&goods)?;
            Ok(AgentAverage {
                agent_id,
                region,
                behavior,
                active,
                samples: acc.samples,
                mean_wealth,
                mean_goods,
            })
        })
        .collect()
}

/// Average agent rows grouped by region name.
///
/// # Errors
///
/// Returns [`ReportError::ArithmeticOverflow`] if a sum overflows.
pub fn average_by_region(reports: &[RunReport]) -> Result<Vec<RegionAverage>, ReportError> {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();
    for report in reports {
        for row in &report.agents {
            groups.entry(row.region.clone()).or_default().add(row)?;
        }
    }

    let goods = all_goods(reports);
    groups
        .into_iter()
        .map(|(region, acc)| {
            let (mean_wealth, mean_goods) = acc.means(&goods)?;
            Ok(RegionAverage {
                region,
                samples: acc.samples,
                mean_wealth,
                mean_goods,
            })
        })
        .collect()
}
