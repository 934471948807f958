use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;
use tri_harness::runners::{
    GoldenConfig, MeshGrowthConfig, PolygonConfig, ScenarioConfig, StressConfig, TimingConfig,
};
use tri_harness::svg_adapter::convert_file;
use tri_harness::{
    run_golden, run_mesh_growth, run_polygons, run_scenarios, run_stress, run_timing,
    HarnessError, Profile, RunReport, SystemInvoker, ToolSet,
};

fn main() -> ExitCode {
    init_tracing();
    match run(&std::env::args().skip(1).collect::<Vec<_>>()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            match crash_signal(&error) {
                Some(signal) => ExitCode::from(u8::try_from(128 + signal).unwrap_or(1)),
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn crash_signal(error: &anyhow::Error) -> Option<i32> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<HarnessError>())
        .and_then(HarnessError::crash_signal)
}

fn usage() -> String {
    [
        "tri-harness usage:",
        "  tri-harness scenarios   [--input-dir <dir>] [--output-dir <dir>]",
        "  tri-harness polygons    [--input-dir <dir>] [--output-dir <dir>]",
        "  tri-harness golden      [--models <dir>] [--require-models]",
        "  tri-harness stress      [--input-dir <dir>] [--iterations <n>] [--seed <n>]",
        "  tri-harness timing      [--input-dir <dir>] [--report <csv>] [--steps <n>] [--seed <n>]",
        "  tri-harness mesh-growth [--input-dir <dir>] [--output-dir <dir>] [--report <csv>] [--steps <n>]",
        "  tri-harness svg2csv     <input.svg> <points.csv> <edges.csv>",
        "",
        "common options:",
        "  --bin-dir <dir>                  directory holding the tools (default: $TRI_HARNESS_BIN_DIR or PATH)",
        "  --debug-build | --release-build  force the `.debug` or the plain tool binaries",
    ]
    .join("\n")
}

#[derive(Debug, Default)]
struct Options {
    bin_dir: Option<PathBuf>,
    profile: Option<Profile>,
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    models: Option<PathBuf>,
    require_models: bool,
    iterations: Option<u64>,
    seed: Option<u64>,
    report: Option<PathBuf>,
    steps: Option<usize>,
    positional: Vec<PathBuf>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Options::default();
        let mut index = 0usize;
        while index < args.len() {
            let arg = args[index].as_str();
            match arg {
                "--debug-build" => options.profile = Some(Profile::Debug),
                "--release-build" => options.profile = Some(Profile::Release),
                "--require-models" => options.require_models = true,
                "--bin-dir" | "--input-dir" | "--output-dir" | "--models" | "--iterations"
                | "--seed" | "--report" | "--steps" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .with_context(|| format!("{arg} requires a value"))?;
                    options.set(arg, value)?;
                }
                flag if flag.starts_with("--") => bail!("unknown option '{flag}'"),
                _ => options.positional.push(PathBuf::from(arg)),
            }
            index += 1;
        }
        Ok(options)
    }

    fn set(&mut self, flag: &str, value: &str) -> Result<()> {
        let number = || -> Result<u64> {
            value
                .parse()
                .with_context(|| format!("invalid value '{value}' for {flag}"))
        };
        match flag {
            "--bin-dir" => self.bin_dir = Some(value.into()),
            "--input-dir" => self.input_dir = Some(value.into()),
            "--output-dir" => self.output_dir = Some(value.into()),
            "--models" => self.models = Some(value.into()),
            "--report" => self.report = Some(value.into()),
            "--iterations" => self.iterations = Some(number()?),
            "--seed" => self.seed = Some(number()?),
            "--steps" => self.steps = Some(usize::try_from(number()?)?),
            other => bail!("{other} takes no value"),
        }
        Ok(())
    }

    fn tool_set(&self) -> ToolSet {
        let mut tools = ToolSet::from_env();
        if let Some(dir) = &self.bin_dir {
            tools = tools.with_bin_dir(dir);
        }
        if let Some(profile) = self.profile {
            tools = tools.with_profile_override(profile);
        }
        tools
    }

    fn input_dir(&self, default: &str) -> PathBuf {
        self.input_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(default))
    }

    fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("output"))
    }
}

fn run(args: &[String]) -> Result<bool> {
    let Some(subcommand) = args.first() else {
        bail!("missing subcommand\n\n{}", usage());
    };
    if matches!(subcommand.as_str(), "help" | "--help" | "-h") {
        println!("{}", usage());
        return Ok(true);
    }

    let options = Options::parse(&args[1..])?;
    if subcommand == "svg2csv" {
        let [svg, points, edges] = options.positional.as_slice() else {
            bail!("svg2csv takes exactly three paths\n\n{}", usage());
        };
        let polygons = convert_file(svg, points, edges)
            .with_context(|| format!("could not convert {}", svg.display()))?;
        println!(
            "{} polygons, {} points",
            polygons.loops().len(),
            polygons.points().len()
        );
        return Ok(true);
    }
    if let Some(extra) = options.positional.first() {
        bail!("unexpected argument '{}'", extra.display());
    }

    let tools = options.tool_set();
    let mut invoker = SystemInvoker::new();
    let report = match subcommand.as_str() {
        "scenarios" => {
            let config = ScenarioConfig::new()
                .with_input_dir(options.input_dir("input"))
                .with_output_dir(options.output_dir());
            run_scenarios(&config, &tools, &mut invoker).context("scenario run aborted")?
        }
        "polygons" => {
            let config = PolygonConfig::new()
                .with_input_dir(options.input_dir("input"))
                .with_output_dir(options.output_dir());
            run_polygons(&config, &tools, &mut invoker).context("polygon run aborted")?
        }
        "golden" => {
            let mut config = GoldenConfig::new().with_require_models(options.require_models);
            if let Some(models) = &options.models {
                config = config.with_models_dir(models);
            }
            run_golden(&config, &tools, &mut invoker).context("golden run aborted")?
        }
        "stress" => {
            let input_dir = options.input_dir("input");
            let mut config = StressConfig::new()
                .with_points_path(input_dir.join("stressTest.csv"))
                .with_archive_dir(&input_dir)
                .with_max_iterations(options.iterations);
            if let Some(seed) = options.seed {
                config = config.with_seed(seed);
            }
            run_stress(&config, &tools, &mut invoker).context("stress run aborted")?
        }
        "timing" => {
            let input_dir = options.input_dir("input");
            let mut config = TimingConfig::new()
                .with_points_path(input_dir.join("timingTest.csv"))
                .with_archive_dir(&input_dir);
            if let Some(seed) = options.seed {
                config = config.with_seed(seed);
            }
            if let Some(steps) = options.steps {
                config = config.with_steps(steps);
            }
            if let Some(report) = &options.report {
                config = config.with_report_path(report);
            }
            run_timing(&config, &tools, &mut invoker)
                .context("timing run aborted")?
                .report
        }
        "mesh-growth" => {
            let mut config = MeshGrowthConfig::new()
                .with_work_dir(options.input_dir("."))
                .with_output_dir(options.output_dir());
            if let Some(steps) = options.steps {
                config = config.with_steps(1, steps);
            }
            if let Some(report) = &options.report {
                config = config.with_report_path(report);
            }
            let samples =
                run_mesh_growth(&config, &tools, &mut invoker).context("mesh growth aborted")?;
            let mut report = RunReport::new();
            for _ in &samples {
                report.count_iteration();
            }
            report
        }
        other => bail!("unknown subcommand '{other}'\n\n{}", usage()),
    };

    println!("{}", report);
    Ok(report.is_success())
}
