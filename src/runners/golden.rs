use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    CaseOutcome, HarnessError, InvocationStatus, Profile, RunReport, ScratchFiles, Tool,
    ToolInvoker, ToolOption, ToolSet,
};

/// Whether a model already has a golden file.
///
/// A golden file is written once, on the first run that finds none, and compared against
/// on every later run. The harness never overwrites it; a mismatch is reported instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoldenState {
    Unseen,
    Recorded,
}

impl GoldenState {
    pub fn probe(golden: &Path) -> Self {
        if golden.exists() {
            GoldenState::Recorded
        } else {
            GoldenState::Unseen
        }
    }
}

/// Settings of the discretizer regression run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldenConfig {
    models_dir: PathBuf,
    intermediate_path: PathBuf,
    require_models: bool,
    profile: Profile,
}

impl Default for GoldenConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            intermediate_path: std::env::temp_dir().join("rfm_discmesh.temp.rfm"),
            require_models: false,
            profile: Profile::Debug,
        }
    }
}

impl GoldenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the `*.obj` models and their `*.lines` golden files.
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Where the converted model is written before discretization.
    pub fn with_intermediate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.intermediate_path = path.into();
        self
    }

    /// Treat a model directory without models as an error instead of a warning.
    pub fn with_require_models(mut self, require: bool) -> Self {
        self.require_models = require;
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }
}

/// Discretizes every model and records or compares its golden file.
///
/// Crashes are recorded like any other failure and never stop the run: every model is
/// attempted.
pub fn run_golden<I: ToolInvoker>(
    config: &GoldenConfig,
    tools: &ToolSet,
    invoker: &mut I,
) -> Result<RunReport, HarnessError> {
    let models = list_models(&config.models_dir)?;
    let mut report = RunReport::new();
    if models.is_empty() {
        if config.require_models {
            return Err(HarnessError::NoModels {
                dir: config.models_dir.clone(),
            });
        }
        tracing::warn!(dir = ?config.models_dir, "no models found");
        return Ok(report);
    }

    for model in models {
        let name = model
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = check_model(config, tools, invoker, &model)?;
        report.record(name, outcome);
    }
    Ok(report)
}

fn list_models(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let entries = fs::read_dir(dir).map_err(|err| HarnessError::io(dir, err))?;
    let mut models = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| HarnessError::io(dir, err))?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "obj") {
            models.push(path);
        }
    }
    models.sort();
    Ok(models)
}

fn check_model<I: ToolInvoker>(
    config: &GoldenConfig,
    tools: &ToolSet,
    invoker: &mut I,
    model: &Path,
) -> Result<CaseOutcome, HarnessError> {
    let mut scratch = ScratchFiles::new();
    let intermediate = scratch.register(&config.intermediate_path);

    let convert = tools
        .command(Tool::ObjToRfm, config.profile)
        .arg_path(model)
        .arg_path(&intermediate)
        .build()?;
    match invoker.run(&convert)? {
        InvocationStatus::Exited(0) => {}
        InvocationStatus::Exited(code) => return Ok(CaseOutcome::ConversionFailed { code }),
        InvocationStatus::Signaled(signal) => return Ok(CaseOutcome::Crashed { signal }),
    }

    let golden = model.with_extension("lines");
    let discretize = tools
        .command(Tool::Discretizer, config.profile)
        .arg_path(&intermediate);

    match GoldenState::probe(&golden) {
        GoldenState::Unseen => {
            println!("Writing {}", golden.display());
            // Anything at the golden path after a failed write is a partial file from
            // this attempt.
            let mut partial = ScratchFiles::new();
            partial.register(&golden);
            let command = discretize
                .option_path(ToolOption::WriteLines, &golden)
                .build()?;
            let status = invoker.run(&command)?;
            if status.is_success() {
                partial.forget(&golden);
                tracing::info!(path = ?golden, "recorded golden file");
                return Ok(CaseOutcome::Recorded);
            }
            Ok(CaseOutcome::from_status(status))
        }
        GoldenState::Recorded => {
            println!("Testing {}", golden.display());
            let command = discretize
                .option_path(ToolOption::TestLines, &golden)
                .build()?;
            Ok(match invoker.run(&command)? {
                InvocationStatus::Exited(0) => CaseOutcome::Verified,
                InvocationStatus::Exited(code) => CaseOutcome::Mismatch { code },
                InvocationStatus::Signaled(signal) => CaseOutcome::Crashed { signal },
            })
        }
    }
}
