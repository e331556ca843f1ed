//! JSON report files.
//!
//! One batch produces, inside the configured output directory:
//!
//! - `run_{n}.json` -- the final per-agent state of run `n`
//! - `id_averages.json` -- means grouped by (agent, region, behavior, active)
//! - `class_averages.json` -- means grouped by region
//! - `behaviors.json` -- the behavior each agent id ran with

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;
use tradenet_agents::BehaviorMap;
use tradenet_core::report::{average_by_agent, average_by_region};
use tradenet_core::runner::BatchResult;
use tradenet_types::{AgentId, TradeBehavior};

use crate::error::EngineError;

/// One row of `behaviors.json`.
#[derive(Debug, Serialize)]
struct BehaviorRow {
    agent_id: AgentId,
    behavior: TradeBehavior,
}

fn behavior_rows(behaviors: &BehaviorMap) -> Vec<BehaviorRow> {
    behaviors
        .iter()
        .map(|(&agent_id, &behavior)| BehaviorRow { agent_id, behavior })
        .collect()
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EngineError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write every report of `batch` into `directory`, creating it if needed.
///
/// Returns the paths written, run files first.
pub fn write_batch(directory: &Path, batch: &BatchResult) -> Result<Vec<PathBuf>, EngineError> {
    std::fs::create_dir_all(directory)?;
    let mut written = Vec::new();

    for report in &batch.reports {
        let path = directory.join(format!("run_{}.json", report.run));
        write_json(&path, report)?;
        written.push(path);
    }

    let by_agent = average_by_agent(&batch.reports)?;
    let path = directory.join("id_averages.json");
    write_json(&path, &by_agent)?;
    written.push(path);

    let by_region = average_by_region(&batch.reports)?;
    let path = directory.join("class_averages.json");
    write_json(&path, &by_region)?;
    written.push(path);

    let path = directory.join("behaviors.json");
    write_json(&path, &behavior_rows(&batch.behaviors))?;
    written.push(path);

    info!(
        directory = %directory.display(),
        files = written.len(),
        "Reports written"
    );
    Ok(written)
}
