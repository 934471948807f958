//! Performance measurements.
//!
//! [run_timing] measures the point triangulator on growing random clouds and reports the
//! median of [TIMING_RUNS] runs per size. [run_mesh_growth] builds ever larger block
//! scenes and measures one discretization per scene.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};

use super::create_dir;
use crate::{
    median_of_runs, timing_cloud, CommandBuilder, FailureRecord, HarnessError, Profile,
    RunReport, TimingReport, TimingSample, Tool, ToolFlag, ToolInvoker, ToolOption, ToolSet,
    TIMING_RUNS,
};

/// Seed of the timing clouds.
pub const TIMING_SEED: u64 = 3373;

/// Settings of the triangulation timing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingConfig {
    points_path: PathBuf,
    archive_dir: PathBuf,
    report_path: PathBuf,
    seed: u64,
    steps: usize,
    step_size: usize,
    profile: Profile,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            points_path: PathBuf::from("input/timingTest.csv"),
            archive_dir: PathBuf::from("input"),
            report_path: PathBuf::from("timing_test.csv"),
            seed: TIMING_SEED,
            steps: 15,
            step_size: 100,
            profile: Profile::Release,
        }
    }
}

impl TimingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.points_path = path.into();
        self
    }

    /// Where inputs the triangulator rejects are copied to.
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = dir.into();
        self
    }

    /// The CSV file receiving one `points, seconds` row per step.
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Number of cloud sizes to measure. Defaults to 15.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Growth of the cloud per step. Defaults to 100 points.
    pub fn with_step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }
}

/// What a timing run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingOutcome {
    pub report: RunReport,
    pub samples: Vec<TimingSample>,
}

/// Measures the point triangulator on clouds of 100, 200, ... points.
///
/// A failing run is still timed. Its input is copied aside once per step so the remaining
/// runs of the step see the same file.
pub fn run_timing<I: ToolInvoker>(
    config: &TimingConfig,
    tools: &ToolSet,
    invoker: &mut I,
) -> Result<TimingOutcome, HarnessError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let command = tools
        .command(Tool::PointTriangulator, config.profile)
        .arg_path(&config.points_path)
        .build()?;
    let mut timing = TimingReport::create(&config.report_path)?;
    let mut report = RunReport::new();

    for step in 0..config.steps {
        let count = (step + 1) * config.step_size;
        let test_case = timing_cloud(&mut rng, count, format!("timingTest.{}", step))?;
        test_case.write_points(&config.points_path)?;

        let mut runs = [Duration::ZERO; TIMING_RUNS];
        let mut archived = false;
        for run in runs.iter_mut() {
            let start = Instant::now();
            let status = invoker.run(&command)?;
            *run = start.elapsed();

            let status = status.check_crash(test_case.name())?;
            if status.is_logical_failure() {
                println!("    Failed");
                if !archived {
                    report.archive(archive_copy(config, step)?);
                    archived = true;
                }
            }
        }

        let sample = TimingSample::new(count, median_of_runs(runs));
        println!(
            "Points: {} Duration: {}",
            count,
            sample.duration.as_secs_f64()
        );
        timing.append(sample)?;
        report.count_iteration();
    }

    Ok(TimingOutcome {
        report,
        samples: timing.into_samples(),
    })
}

fn archive_copy(config: &TimingConfig, step: usize) -> Result<FailureRecord, HarnessError> {
    create_dir(&config.archive_dir)?;
    let path = config
        .archive_dir
        .join(format!("timingTestFailure.{}.csv", step));
    fs::copy(&config.points_path, &path).map_err(|err| HarnessError::io(&path, err))?;
    Ok(FailureRecord {
        iteration: step as u64,
        path,
    })
}

/// Settings of the mesh growth measurement.
///
/// All relative paths are resolved against the work directory.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGrowthConfig {
    work_dir: PathBuf,
    null_model: PathBuf,
    block_model: PathBuf,
    output_dir: PathBuf,
    report_path: PathBuf,
    first_step: usize,
    last_step: usize,
    spacing: f64,
    sun_azimuth: f64,
    sun_elevation: f64,
    sky_color: f64,
    profile: Profile,
}

impl Default for MeshGrowthConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::new(),
            null_model: PathBuf::from("null.obj"),
            block_model: PathBuf::from("box-stack.obj"),
            output_dir: PathBuf::from("output"),
            report_path: PathBuf::from("performance.csv"),
            first_step: 1,
            last_step: 99,
            spacing: 10.0,
            sun_azimuth: 210.0,
            sun_elevation: 65.0,
            sky_color: 0.2,
            profile: Profile::Release,
        }
    }
}

impl MeshGrowthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// The empty scene every step starts from. Defaults to `null.obj`.
    pub fn with_null_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.null_model = path.into();
        self
    }

    /// The block placed on the grid. Defaults to `box-stack.obj`.
    pub fn with_block_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.block_model = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = path.into();
        self
    }

    /// Step `s` places an `s` x `s` grid of blocks. Defaults to `1..=99`.
    pub fn with_steps(mut self, first: usize, last: usize) -> Self {
        self.first_step = first;
        self.last_step = last;
        self
    }

    /// Distance between neighboring blocks. Defaults to 10.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.work_dir.join(path)
    }
}

/// Builds scenes of `s` x `s` blocks and times their discretization.
///
/// Returns one sample per step, counting faces. Every tool must succeed; the first failure
/// ends the run.
pub fn run_mesh_growth<I: ToolInvoker>(
    config: &MeshGrowthConfig,
    tools: &ToolSet,
    invoker: &mut I,
) -> Result<Vec<TimingSample>, HarnessError> {
    let null_rfm = config.resolve("null.rfm");
    let block_rfm = config.resolve("box-stack.rfm");
    let model = config.resolve("model.rfm");
    let temp = config.resolve("temp.rfm");
    let output_dir = config.resolve(&config.output_dir);
    let tool = |kind: Tool| tools.command(kind, config.profile);

    run_required(
        invoker,
        tool(Tool::ObjToRfm)
            .arg_path(config.resolve(&config.null_model))
            .arg_path(&null_rfm),
    )?;
    run_required(
        invoker,
        tool(Tool::ObjToRfm)
            .arg_path(config.resolve(&config.block_model))
            .arg_path(&block_rfm)
            .flag(ToolFlag::ResetNormals),
    )?;
    create_dir(&output_dir)?;
    let mut timing = TimingReport::create(config.resolve(&config.report_path))?;

    for step in config.first_step..=config.last_step {
        println!();
        println!("-------------- {} --------------", step);
        println!();

        fs::copy(&null_rfm, &model).map_err(|err| HarnessError::io(&model, err))?;
        for i in 0..step {
            for j in 0..step {
                let rotation = ((67 * i + 79 * j) % 4) as f64 * 90.0;
                run_required(
                    invoker,
                    tool(Tool::Transform)
                        .arg_path(&block_rfm)
                        .arg_path(&temp)
                        .option_vector(
                            ToolOption::Translate,
                            [i as f64 * config.spacing, 0.0, j as f64 * config.spacing],
                        )
                        .option_vector(ToolOption::Rotate, [0.0, rotation, 0.0]),
                )?;
                run_required(
                    invoker,
                    tool(Tool::Concatenate)
                        .arg_path(&model)
                        .arg_path(&temp)
                        .arg_path(&temp),
                )?;
                fs::rename(&temp, &model).map_err(|err| HarnessError::io(&temp, err))?;
            }
        }

        let rfm = output_dir.join(format!("model.{}.rfm", step));
        let obj = output_dir.join(format!("model.{}.obj", step));
        let wrl = output_dir.join(format!("model.{}.wrl", step));
        fs::rename(&model, &rfm).map_err(|err| HarnessError::io(&model, err))?;
        run_required(invoker, tool(Tool::RfmToObj).arg_path(&rfm).arg_path(&obj))?;

        let print = tool(Tool::Print).arg_path(&rfm).build()?;
        println!("{}", print);
        let summary = invoker.run_captured(&print)?;
        summary.status.require_success(&print.program_name())?;
        let faces = scrape_labeled_count(&summary.stdout, "Faces")?;

        let discretize = tool(Tool::Discretizer)
            .arg_path(&rfm)
            .arg_path(&temp)
            .option_scalar(ToolOption::SunAzimuth, config.sun_azimuth)
            .option_scalar(ToolOption::SunElevation, config.sun_elevation)
            .flag(ToolFlag::Debug);
        let start = Instant::now();
        run_required(invoker, discretize)?;
        let duration = start.elapsed();

        run_required(
            invoker,
            tool(Tool::RfmToWrl)
                .arg_path(&temp)
                .arg_path(&wrl)
                .option_vector(ToolOption::SkyColor, [config.sky_color; 3]),
        )?;

        timing.append(TimingSample::new(faces, duration))?;
    }
    Ok(timing.into_samples())
}

fn run_required<I: ToolInvoker>(
    invoker: &mut I,
    command: CommandBuilder,
) -> Result<(), HarnessError> {
    let command = command.build()?;
    println!("{}", command);
    invoker
        .run(&command)?
        .require_success(&command.program_name())
}

/// Reads the number after `label:` on the first line of `summary` that carries it.
pub fn scrape_labeled_count(summary: &str, label: &str) -> Result<usize, HarnessError> {
    let missing = || HarnessError::MissingSummaryField {
        label: label.to_string(),
    };
    let prefix = format!("{}:", label);
    let line = summary
        .lines()
        .find(|line| line.contains(&prefix))
        .ok_or_else(missing)?;
    let value = line.splitn(2, &prefix).nth(1).ok_or_else(missing)?;
    value.trim().parse().map_err(|_| missing())
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::path::Path;

    use super::{run_mesh_growth, run_timing, scrape_labeled_count, MeshGrowthConfig, TimingConfig};
    use crate::test_utilities::{touch_argument, ScriptedInvoker};
    use crate::{HarnessError, InvocationStatus, ToolCommand, ToolOption, ToolSet, TIMING_RUNS};

    fn timing_config(dir: &Path) -> TimingConfig {
        TimingConfig::new()
            .with_points_path(dir.join("input/timingTest.csv"))
            .with_archive_dir(dir.join("input"))
            .with_report_path(dir.join("timing_test.csv"))
            .with_steps(3)
    }

    #[test]
    fn test_timing_runs_seven_times_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut invoker = ScriptedInvoker::succeeding();
        let outcome = run_timing(&timing_config(dir.path()), &ToolSet::new(), &mut invoker).unwrap();

        assert_eq!(invoker.log().len(), 3 * TIMING_RUNS);
        assert!(invoker
            .program_names()
            .iter()
            .all(|name| name == "triangulate_points"));
        let counts: Vec<_> = outcome.samples.iter().map(|sample| sample.count).collect();
        assert_eq!(counts, [100, 200, 300]);
        assert!(outcome.report.is_success());

        let csv = fs::read_to_string(dir.path().join("timing_test.csv")).unwrap();
        let rows: Vec<_> = csv.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("200, "));
        // The last cloud is still on disk.
        let points = fs::read_to_string(dir.path().join("input/timingTest.csv")).unwrap();
        assert_eq!(points.lines().count(), 300);
    }

    #[test]
    fn test_failing_step_is_copied_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut calls = 0;
        let mut invoker = ScriptedInvoker::new(move |_| {
            calls += 1;
            // Every run of the second step fails.
            if (TIMING_RUNS + 1..=2 * TIMING_RUNS).contains(&calls) {
                InvocationStatus::Exited(1)
            } else {
                InvocationStatus::Exited(0)
            }
        });
        let outcome = run_timing(&timing_config(dir.path()), &ToolSet::new(), &mut invoker).unwrap();

        assert_eq!(outcome.samples.len(), 3);
        assert_eq!(outcome.report.archived().len(), 1);
        let failure = &outcome.report.archived()[0];
        assert_eq!(failure.iteration, 1);
        assert_eq!(failure.path, dir.path().join("input/timingTestFailure.1.csv"));
        assert_eq!(fs::read_to_string(&failure.path).unwrap().lines().count(), 200);
    }

    #[test]
    fn test_timing_crash_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let mut invoker = ScriptedInvoker::new(|_| InvocationStatus::Signaled(9));
        let result = run_timing(&timing_config(dir.path()), &ToolSet::new(), &mut invoker);
        assert!(matches!(result, Err(HarnessError::Crashed { signal: 9, .. })));
        assert_eq!(invoker.log().len(), 1);
    }

    #[test]
    fn test_scrape_faces() {
        let summary = "Name: model\n   Vertices: 96\n      Faces: 48\n";
        assert_eq!(scrape_labeled_count(summary, "Faces").unwrap(), 48);
        assert_eq!(scrape_labeled_count(summary, "Vertices").unwrap(), 96);
        assert!(matches!(
            scrape_labeled_count(summary, "Edges"),
            Err(HarnessError::MissingSummaryField { .. })
        ));
        assert!(scrape_labeled_count("Faces: many", "Faces").is_err());
    }

    /// Imitates the mesh tools by creating their output files.
    fn mesh_tools(command: &ToolCommand) -> InvocationStatus {
        match command.program_name().as_str() {
            "rfm_cat" => touch_argument(command, 2),
            "rfm_print" => {}
            _ => touch_argument(command, 1),
        }
        InvocationStatus::Exited(0)
    }

    fn mesh_config(dir: &Path) -> MeshGrowthConfig {
        MeshGrowthConfig::new().with_work_dir(dir).with_steps(1, 2)
    }

    #[test]
    fn test_mesh_growth_builds_grids() {
        let dir = tempfile::tempdir().unwrap();
        let mut invoker = ScriptedInvoker::new(mesh_tools).with_stdout("      Faces: 1200\n");

        let samples = run_mesh_growth(&mesh_config(dir.path()), &ToolSet::new(), &mut invoker)
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|sample| sample.count == 1200));

        let transforms: Vec<_> = invoker
            .log()
            .iter()
            .filter(|command| command.program_name() == "rfm_trans")
            .collect();
        // One block in step 1, four in step 2.
        assert_eq!(transforms.len(), 5);
        let last = transforms[4];
        assert_eq!(
            last.to_string().split("--translate").nth(1).unwrap().trim(),
            "10 0 10 --rotate 0 180 0"
        );
        assert_eq!(last.option_value(ToolOption::Rotate).unwrap(), "0");

        for step in 1..=2 {
            for extension in ["rfm", "obj", "wrl"] {
                let path = dir.path().join(format!("output/model.{step}.{extension}"));
                assert!(path.exists(), "{path:?}");
            }
        }
        let csv = fs::read_to_string(dir.path().join("performance.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.starts_with("1200, "));
    }

    #[test]
    fn test_mesh_growth_requires_every_tool() {
        let dir = tempfile::tempdir().unwrap();
        let mut invoker = ScriptedInvoker::new(|command| {
            if command.program_name() == "rfm_discmesh" {
                InvocationStatus::Exited(3)
            } else {
                mesh_tools(command)
            }
        })
        .with_stdout("Faces: 12");
        let result = run_mesh_growth(&mesh_config(dir.path()), &ToolSet::new(), &mut invoker);
        assert!(matches!(
            result,
            Err(HarnessError::ToolFailed { code: 3, .. })
        ));

        let mut invoker = ScriptedInvoker::new(mesh_tools);
        let result = run_mesh_growth(&mesh_config(dir.path()), &ToolSet::new(), &mut invoker);
        assert!(matches!(
            result,
            Err(HarnessError::MissingSummaryField { .. })
        ));
    }
}
