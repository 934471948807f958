//! # tri-harness
//! A test harness for command line geometry tools: a point triangulator, a polygon
//! triangulator and a mesh discretizer with its format converters.
//!
//! The harness never looks inside the tools. It generates inputs, runs the tools as child
//! processes and judges them by how they terminate:
//!
//! * `Exited(0)` is a pass,
//! * any other exit code is a logical failure that is recorded and, for randomized inputs,
//!   archived for later analysis,
//! * termination by a signal is a crash and stops the harness.
//!
//! # Runners
//! * [run_scenarios]: thirteen fixed point distributions against the point triangulator
//! * [run_polygons]: SVG drawings against the polygon triangulator
//! * [run_golden]: discretizer output compared with write-once golden files
//! * [run_stress]: an endless stream of random point sets
//! * [run_timing] and [run_mesh_growth]: median timings written to CSV files
//!
//! # Features
//! The `serde` feature derives `Serialize` and `Deserialize` for the data types.

#![forbid(unsafe_code)]

mod command;
mod config;
mod error;
mod invocation;
mod point;
mod report;
mod test_case;
mod unique;

pub mod generators;
pub mod runners;
pub mod svg_adapter;

#[cfg(test)]
mod test_utilities;

pub use crate::command::{CommandBuilder, ToolCommand, ToolFlag, ToolOption};
pub use crate::config::{Profile, Tool, ToolSet, BIN_DIR_VARIABLE};
pub use crate::error::HarnessError;
pub use crate::generators::{
    timing_cloud, GeneratorParameters, Scenario, StressGenerator, StressKind, StressParameters,
};
pub use crate::invocation::{CapturedRun, InvocationStatus, SystemInvoker, ToolInvoker};
pub use crate::point::{Edge, Point2, PointKey};
pub use crate::report::{
    median_of_runs, CaseOutcome, CaseRecord, FailureRecord, RunReport, TimingReport,
    TimingSample, TIMING_RUNS,
};
pub use crate::runners::{
    run_golden, run_mesh_growth, run_polygons, run_scenarios, run_stress, run_timing,
};
pub use crate::svg_adapter::PolygonSet;
pub use crate::test_case::{ScratchFiles, TestCase};
pub use crate::unique::{unique_points, OrderedUniqueSet, UniqueKey};
