use std::fs;
use std::path::PathBuf;

use rand::{rngs::StdRng, SeedableRng};

use crate::{
    FailureRecord, HarnessError, Profile, RunReport, StressGenerator, StressKind,
    StressParameters, Tool, ToolInvoker, ToolSet,
};

/// Seed of the stress sequence.
pub const STRESS_SEED: u64 = 3373;

/// Settings of the randomized stress run.
#[derive(Debug, Clone, PartialEq)]
pub struct StressConfig {
    points_path: PathBuf,
    archive_dir: PathBuf,
    seed: u64,
    max_iterations: Option<u64>,
    profile: Profile,
    parameters: StressParameters,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            points_path: PathBuf::from("input/stressTest.csv"),
            archive_dir: PathBuf::from("input"),
            seed: STRESS_SEED,
            max_iterations: None,
            profile: Profile::Debug,
            parameters: StressParameters::default(),
        }
    }
}

impl StressConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The point file rewritten on every iteration.
    pub fn with_points_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.points_path = path.into();
        self
    }

    /// Where failing inputs are moved to.
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Stops after `iterations` iterations. Without a bound the run only ends with a crash.
    pub fn with_max_iterations(mut self, iterations: Option<u64>) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_parameters(mut self, parameters: StressParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Feeds random point sets into the point triangulator until it crashes or the iteration
/// bound is reached.
///
/// An input the triangulator rejects is moved to `stressTestFailure.<iteration>.csv` in
/// the archive directory and the run goes on.
pub fn run_stress<I: ToolInvoker>(
    config: &StressConfig,
    tools: &ToolSet,
    invoker: &mut I,
) -> Result<RunReport, HarnessError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let generator = StressGenerator::new(config.parameters.clone());
    let command = tools
        .command(Tool::PointTriangulator, config.profile)
        .arg_path(&config.points_path)
        .build()?;
    let mut report = RunReport::new();

    let mut iteration: u64 = 1;
    while config.max_iterations.map_or(true, |max| iteration <= max) {
        println!("Test: {}  Failures: {}", iteration, report.failure_count());
        let name = format!("stressTest.{}", iteration);
        let test_case =
            generator.generate(&mut rng, StressKind::for_iteration(iteration), name.as_str())?;
        test_case.write_points(&config.points_path)?;

        let status = invoker.run(&command)?.check_crash(&name)?;
        if status.is_logical_failure() {
            println!("    Failed");
            fs::create_dir_all(&config.archive_dir)
                .map_err(|err| HarnessError::io(&config.archive_dir, err))?;
            let archived = config
                .archive_dir
                .join(format!("stressTestFailure.{}.csv", iteration));
            fs::rename(&config.points_path, &archived)
                .map_err(|err| HarnessError::io(&config.points_path, err))?;
            report.archive(FailureRecord {
                iteration,
                path: archived,
            });
        }
        report.count_iteration();
        iteration += 1;
    }
    Ok(report)
}
