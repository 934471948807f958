use std::path::PathBuf;

use crate::Edge;

/// Errors that stop a runner.
///
/// Logical failures of a tool (non-zero exit code) are normally recorded in a
/// [RunReport](crate::RunReport) instead of being returned as an error. The exceptions are
/// [HarnessError::Crashed], which always aborts the harness, and [HarnessError::ToolFailed]
/// for runners that cannot continue without the tool's output.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Reading or writing a harness file failed.
    #[error("i/o error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tool could not be started at all.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A tool was terminated by a signal.
    #[error("{case}: tool terminated by signal {signal}")]
    Crashed { case: String, signal: i32 },

    /// A tool exited with a non-zero code where the runner needs it to succeed.
    #[error("{case}: tool exited with code {code}")]
    ToolFailed { case: String, code: i32 },

    /// A command line failed validation before it was run.
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },

    /// An edge refers to a point that does not exist.
    #[error("{case}: edge {edge:?} is out of range for {point_count} points")]
    InvalidEdge {
        case: String,
        edge: Edge,
        point_count: usize,
    },

    /// The vector graphics input could not be converted.
    #[error("svg error in {path:?}: {reason}")]
    Svg { path: PathBuf, reason: String },

    /// A tool's textual summary lacked an expected line.
    #[error("tool summary has no `{label}` line")]
    MissingSummaryField { label: String },

    /// The model directory holds no models and models are required.
    #[error("no models found in {dir:?}")]
    NoModels { dir: PathBuf },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the terminating signal if this error represents a crashed tool.
    pub fn crash_signal(&self) -> Option<i32> {
        match self {
            HarnessError::Crashed { signal, .. } => Some(*signal),
            _ => None,
        }
    }
}
