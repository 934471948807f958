use std::path::PathBuf;

use super::{create_dir, print_status_line};
use crate::{
    CaseOutcome, GeneratorParameters, HarnessError, Profile, RunReport, Scenario, ScratchFiles,
    TestCase, Tool, ToolInvoker, ToolOption, ToolSet,
};

/// Settings of the point triangulator regression run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    profile: Profile,
    parameters: GeneratorParameters,
    scenarios: Vec<Scenario>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            profile: Profile::Debug,
            parameters: GeneratorParameters::default(),
            scenarios: Scenario::ALL.to_vec(),
        }
    }
}

impl ScenarioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory for the generated point and edge files. Defaults to `input`.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Directory the triangulator renders its SVG files into. Defaults to `output`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_parameters(mut self, parameters: GeneratorParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Restricts the run to the given scenarios. Defaults to [Scenario::ALL].
    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = Scenario>) -> Self {
        self.scenarios = scenarios.into_iter().collect();
        self
    }
}

/// Runs the point triangulator on every configured scenario.
///
/// Returns [HarnessError::Crashed] as soon as the triangulator crashes. The scratch files
/// of the crashed case are removed before the error reaches the caller.
pub fn run_scenarios<I: ToolInvoker>(
    config: &ScenarioConfig,
    tools: &ToolSet,
    invoker: &mut I,
) -> Result<RunReport, HarnessError> {
    create_dir(&config.output_dir)?;
    let mut report = RunReport::new();
    for scenario in &config.scenarios {
        let test_case = scenario.generate(&config.parameters)?;
        let outcome = run_case(config, tools, invoker, &test_case)?;
        report.record(test_case.name(), outcome);
    }
    Ok(report)
}

fn run_case<I: ToolInvoker>(
    config: &ScenarioConfig,
    tools: &ToolSet,
    invoker: &mut I,
    test_case: &TestCase,
) -> Result<CaseOutcome, HarnessError> {
    let name = test_case.name();
    let points_path = config.input_dir.join(format!("{}.points.csv", name));
    let edges_path = config.input_dir.join(format!("{}.edges.csv", name));
    let (_scratch, edges) = ScratchFiles::write_test_case(test_case, &points_path, edges_path)?;

    let mut command = tools
        .command(Tool::PointTriangulator, config.profile)
        .arg_path(&points_path)
        .option_path(
            ToolOption::SvgFile,
            config.output_dir.join(format!("{}.svg", name)),
        );
    if let Some(edges) = &edges {
        command = command.option_path(ToolOption::EdgeFile, edges);
    }
    let command = command.build()?;

    println!("{}", command);
    let status = invoker.run(&command)?;
    print_status_line(status);
    let status = status.check_crash(name)?;
    Ok(CaseOutcome::from_status(status))
}
