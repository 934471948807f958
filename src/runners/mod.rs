//! The regression, stress and timing runners.
//!
//! Every runner drives one external tool through a [ToolInvoker](crate::ToolInvoker) and
//! prints one status line per case to standard output. Logical failures are collected in
//! the returned [RunReport](crate::RunReport); a crashed tool ends the runner with
//! [HarnessError::Crashed](crate::HarnessError::Crashed) unless noted otherwise.

mod golden;
mod polygons;
mod scenarios;
mod stress;
mod timing;

pub use golden::{run_golden, GoldenConfig, GoldenState};
pub use polygons::{run_polygons, PolygonConfig};
pub use scenarios::{run_scenarios, ScenarioConfig};
pub use stress::{run_stress, StressConfig, STRESS_SEED};
pub use timing::{
    run_mesh_growth, run_timing, scrape_labeled_count, MeshGrowthConfig, TimingConfig,
    TimingOutcome, TIMING_SEED,
};

use std::fs;
use std::path::Path;

use crate::HarnessError;

fn create_dir(dir: &Path) -> Result<(), HarnessError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|err| HarnessError::io(dir, err))
}

/// Prints the status line the runners use for a crashed or failed tool.
fn print_status_line(status: crate::InvocationStatus) {
    if status.is_crash() {
        println!("    Interrupted");
    } else if status.is_logical_failure() {
        println!("    Failed");
    }
}
