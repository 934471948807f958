//! Typed command lines for the external tools.
//!
//! Arguments are collected as separate `OsString`s and handed to the operating system
//! without a shell, so paths with spaces or quotes need no escaping.

use std::ffi::{OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::path::Path;

use crate::HarnessError;

/// The valued options understood by the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolOption {
    /// Discretizer: record critical line segments into a golden file.
    WriteLines,
    /// Discretizer: compare critical line segments against a golden file.
    TestLines,
    /// Triangulators: render the result into an SVG file.
    SvgFile,
    /// Point triangulator: CSV file of constraint edges.
    EdgeFile,
    Translate,
    Rotate,
    SunAzimuth,
    SunElevation,
    SkyColor,
}

impl ToolOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolOption::WriteLines => "--write-lines",
            ToolOption::TestLines => "--test-lines",
            ToolOption::SvgFile => "--svg-file",
            ToolOption::EdgeFile => "--edge-file",
            ToolOption::Translate => "--translate",
            ToolOption::Rotate => "--rotate",
            ToolOption::SunAzimuth => "--sun-azimuth",
            ToolOption::SunElevation => "--sun-elevation",
            ToolOption::SkyColor => "--sky-color",
        }
    }

    fn arity(&self) -> OptionArity {
        match self {
            ToolOption::WriteLines
            | ToolOption::TestLines
            | ToolOption::SvgFile
            | ToolOption::EdgeFile => OptionArity::Path,
            ToolOption::SunAzimuth | ToolOption::SunElevation => OptionArity::Scalar,
            ToolOption::Translate | ToolOption::Rotate | ToolOption::SkyColor => {
                OptionArity::Vector
            }
        }
    }
}

impl Display for ToolOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolFlag {
    ResetNormals,
    Debug,
}

impl ToolFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolFlag::ResetNormals => "--reset-normals",
            ToolFlag::Debug => "--debug",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionArity {
    Path,
    Scalar,
    Vector,
}

/// A validated command line: a program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ToolCommand {
    /// Starts building a command for `program`.
    pub fn builder(program: impl Into<OsString>) -> CommandBuilder {
        CommandBuilder {
            program: program.into(),
            args: Vec::new(),
            error: None,
        }
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Returns the value following `option`, if the command carries it.
    ///
    /// For options with several values only the first one is returned.
    pub fn option_value(&self, option: ToolOption) -> Option<&OsStr> {
        let position = self.args.iter().position(|arg| arg == option.as_str())?;
        self.args.get(position + 1).map(|value| value.as_os_str())
    }

    pub fn has_flag(&self, flag: ToolFlag) -> bool {
        self.args.iter().any(|arg| arg == flag.as_str())
    }

    /// Returns the file name of the program without directories.
    pub fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    pub(crate) fn to_process(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl Display for ToolCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Collects the arguments of a [ToolCommand].
///
/// The first invalid argument is remembered and reported by [CommandBuilder::build], so
/// calls can be chained without checking each step.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    program: OsString,
    args: Vec<OsString>,
    error: Option<String>,
}

impl CommandBuilder {
    /// Appends a positional path argument.
    pub fn arg_path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            self.fail("empty positional path".to_string());
        }
        self.args.push(path.as_os_str().to_owned());
        self
    }

    /// Appends an option that takes a single path.
    pub fn option_path(mut self, option: ToolOption, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if option.arity() != OptionArity::Path {
            self.fail(format!("{} does not take a path", option));
        } else if path.as_os_str().is_empty() {
            self.fail(format!("{} needs a non-empty path", option));
        }
        self.args.push(option.as_str().into());
        self.args.push(path.as_os_str().to_owned());
        self
    }

    /// Appends an option that takes a single number.
    pub fn option_scalar(mut self, option: ToolOption, value: f64) -> Self {
        if option.arity() != OptionArity::Scalar {
            self.fail(format!("{} does not take a single number", option));
        }
        self.check_finite(option, value);
        self.args.push(option.as_str().into());
        self.args.push(format_number(value).into());
        self
    }

    /// Appends an option that takes three numbers.
    pub fn option_vector(mut self, option: ToolOption, values: [f64; 3]) -> Self {
        if option.arity() != OptionArity::Vector {
            self.fail(format!("{} does not take three numbers", option));
        }
        self.args.push(option.as_str().into());
        for value in values {
            self.check_finite(option, value);
            self.args.push(format_number(value).into());
        }
        self
    }

    pub fn flag(mut self, flag: ToolFlag) -> Self {
        self.args.push(flag.as_str().into());
        self
    }

    /// Finishes the command, reporting the first invalid argument.
    pub fn build(self) -> Result<ToolCommand, HarnessError> {
        if self.program.is_empty() {
            return Err(HarnessError::InvalidCommand {
                reason: "empty program name".to_string(),
            });
        }
        if let Some(reason) = self.error {
            return Err(HarnessError::InvalidCommand {
                reason: format!("{}: {}", self.program.to_string_lossy(), reason),
            });
        }
        Ok(ToolCommand {
            program: self.program,
            args: self.args,
        })
    }

    fn check_finite(&mut self, option: ToolOption, value: f64) {
        if !value.is_finite() {
            self.fail(format!("{} got non-finite value {}", option, value));
        }
    }

    fn fail(&mut self, reason: String) {
        if self.error.is_none() {
            self.error = Some(reason);
        }
    }
}

/// Whole numbers are printed without a fraction (`90`, not `90.0`).
fn format_number(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod test {
    use super::{ToolCommand, ToolFlag, ToolOption};
    use crate::HarnessError;

    #[test]
    fn test_build_point_triangulator_command() {
        let command = ToolCommand::builder("triangulate_points.debug")
            .arg_path("input/clusterTest.points.csv")
            .option_path(ToolOption::SvgFile, "output/clusterTest.svg")
            .build()
            .unwrap();

        assert_eq!(command.program_name(), "triangulate_points.debug");
        assert_eq!(
            command.to_string(),
            "triangulate_points.debug input/clusterTest.points.csv --svg-file output/clusterTest.svg"
        );
        assert_eq!(
            command.option_value(ToolOption::SvgFile).unwrap(),
            "output/clusterTest.svg"
        );
        assert!(command.option_value(ToolOption::EdgeFile).is_none());
    }

    #[test]
    fn test_vector_options_format_numbers() {
        let command = ToolCommand::builder("rfm_trans")
            .arg_path("box-stack.rfm")
            .arg_path("temp.rfm")
            .option_vector(ToolOption::Translate, [20.0, 0.0, 10.0])
            .option_vector(ToolOption::Rotate, [0.0, 270.0, 0.0])
            .build()
            .unwrap();
        assert_eq!(
            command.to_string(),
            "rfm_trans box-stack.rfm temp.rfm --translate 20 0 10 --rotate 0 270 0"
        );
    }

    #[test]
    fn test_paths_with_spaces_stay_single_arguments() {
        let command = ToolCommand::builder("obj2rfm")
            .arg_path("models/my model.obj")
            .arg_path("/tmp/out.rfm")
            .flag(ToolFlag::ResetNormals)
            .build()
            .unwrap();
        assert_eq!(command.args().len(), 3);
        assert_eq!(command.args()[0], "models/my model.obj");
        assert!(command.has_flag(ToolFlag::ResetNormals));
        assert!(!command.has_flag(ToolFlag::Debug));
        assert_eq!(
            command.to_string(),
            "obj2rfm \"models/my model.obj\" /tmp/out.rfm --reset-normals"
        );
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        let not_finite = ToolCommand::builder("rfm_discmesh")
            .option_scalar(ToolOption::SunAzimuth, f64::NAN)
            .build();
        assert!(matches!(
            not_finite,
            Err(HarnessError::InvalidCommand { .. })
        ));

        let wrong_arity = ToolCommand::builder("rfm_discmesh")
            .option_scalar(ToolOption::Translate, 1.0)
            .build();
        assert!(wrong_arity.is_err());

        let empty_path = ToolCommand::builder("triangulate_points")
            .option_path(ToolOption::EdgeFile, "")
            .build();
        assert!(empty_path.is_err());

        assert!(ToolCommand::builder("").build().is_err());
    }
}
