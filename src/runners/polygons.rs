use std::fs;
use std::path::{Path, PathBuf};

use super::{create_dir, print_status_line};
use crate::svg_adapter::convert_file;
use crate::{
    CaseOutcome, HarnessError, Profile, RunReport, ScratchFiles, Tool, ToolInvoker, ToolOption,
    ToolSet,
};

/// Settings of the polygon triangulator regression run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolygonConfig {
    input_dir: PathBuf,
    output_dir: PathBuf,
    scratch_dir: PathBuf,
    profile: Profile,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            scratch_dir: PathBuf::new(),
            profile: Profile::Debug,
        }
    }
}

impl PolygonConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the SVG drawings. Defaults to `input`.
    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Directory for `points.csv` and `edges.csv`. Defaults to the working directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }
}

/// Converts every drawing in the input directory and triangulates it.
pub fn run_polygons<I: ToolInvoker>(
    config: &PolygonConfig,
    tools: &ToolSet,
    invoker: &mut I,
) -> Result<RunReport, HarnessError> {
    create_dir(&config.output_dir)?;
    create_dir(&config.scratch_dir)?;
    let mut report = RunReport::new();
    for drawing in list_drawings(&config.input_dir)? {
        let name = drawing
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let outcome = run_drawing(config, tools, invoker, &drawing, &name)?;
        report.record(name, outcome);
    }
    Ok(report)
}

/// Regular files of `dir`, sorted by name. Version control directories are skipped.
fn list_drawings(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let entries = fs::read_dir(dir).map_err(|err| HarnessError::io(dir, err))?;
    let mut drawings = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| HarnessError::io(dir, err))?;
        let path = entry.path();
        if entry.file_name() == ".svn" || path.is_dir() {
            continue;
        }
        drawings.push(path);
    }
    drawings.sort();
    Ok(drawings)
}

fn run_drawing<I: ToolInvoker>(
    config: &PolygonConfig,
    tools: &ToolSet,
    invoker: &mut I,
    drawing: &Path,
    name: &str,
) -> Result<CaseOutcome, HarnessError> {
    let mut scratch = ScratchFiles::new();
    let points_path = scratch.register(config.scratch_dir.join("points.csv"));
    let edges_path = scratch.register(config.scratch_dir.join("edges.csv"));

    println!(
        "svg2csv {} {} {}",
        drawing.display(),
        points_path.display(),
        edges_path.display()
    );
    if let Err(err) = convert_file(drawing, &points_path, &edges_path) {
        println!("    Failed");
        tracing::warn!(%err, "conversion failed");
        return Ok(CaseOutcome::Error {
            reason: err.to_string(),
        });
    }

    // `a.b.svg` renders to `a.svg`.
    let stem = name.split('.').next().unwrap_or(name);
    let command = tools
        .command(Tool::PolygonTriangulator, config.profile)
        .arg_path(&points_path)
        .arg_path(&edges_path)
        .option_path(
            ToolOption::SvgFile,
            config.output_dir.join(format!("{}.svg", stem)),
        )
        .build()?;
    println!("{}", command);
    let status = invoker.run(&command)?;
    print_status_line(status);
    let status = status.check_crash(name)?;
    Ok(CaseOutcome::from_status(status))
}
