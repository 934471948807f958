//! Accumulating the results of a run.

use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{HarnessError, InvocationStatus};

/// Number of times the timing runner repeats every measurement.
pub const TIMING_RUNS: usize = 7;

/// The result of running a tool on one case.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum CaseOutcome {
    Passed,
    /// The tool exited with a non-zero code.
    Failed { code: i32 },
    /// The tool was terminated by a signal.
    Crashed { signal: i32 },
    /// A missing golden file was written.
    Recorded,
    /// The output matched an existing golden file.
    Verified,
    /// The output differed from an existing golden file.
    Mismatch { code: i32 },
    /// A model could not be converted into the discretizer's input format.
    ConversionFailed { code: i32 },
    /// The harness could not prepare the case.
    Error { reason: String },
}

impl CaseOutcome {
    /// Maps a plain tool status onto [CaseOutcome::Passed], [CaseOutcome::Failed] or
    /// [CaseOutcome::Crashed].
    pub fn from_status(status: InvocationStatus) -> Self {
        match status {
            InvocationStatus::Exited(0) => CaseOutcome::Passed,
            InvocationStatus::Exited(code) => CaseOutcome::Failed { code },
            InvocationStatus::Signaled(signal) => CaseOutcome::Crashed { signal },
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            CaseOutcome::Passed | CaseOutcome::Recorded | CaseOutcome::Verified
        )
    }
}

impl Display for CaseOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            CaseOutcome::Passed => write!(f, "passed"),
            CaseOutcome::Failed { code } => write!(f, "failed with code {}", code),
            CaseOutcome::Crashed { signal } => write!(f, "crashed with signal {}", signal),
            CaseOutcome::Recorded => write!(f, "golden file recorded"),
            CaseOutcome::Verified => write!(f, "verified"),
            CaseOutcome::Mismatch { code } => write!(f, "golden mismatch (code {})", code),
            CaseOutcome::ConversionFailed { code } => {
                write!(f, "conversion failed with code {}", code)
            }
            CaseOutcome::Error { reason } => write!(f, "error: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct CaseRecord {
    pub name: String,
    pub outcome: CaseOutcome,
}

/// A failing input that was moved or copied aside for later analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct FailureRecord {
    pub iteration: u64,
    pub path: PathBuf,
}

/// Collects the outcome of a run.
///
/// Runners fill one report each; the driver merges them and derives the exit status from
/// [RunReport::is_success].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct RunReport {
    cases: Vec<CaseRecord>,
    archived: Vec<FailureRecord>,
    iterations: u64,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, outcome: CaseOutcome) {
        if outcome.is_failure() {
            tracing::info!(%outcome, "case failed");
        }
        self.cases.push(CaseRecord {
            name: name.into(),
            outcome,
        });
    }

    pub fn archive(&mut self, failure: FailureRecord) {
        tracing::info!(iteration = failure.iteration, path = ?failure.path, "archived failing input");
        self.archived.push(failure);
    }

    /// Counts one finished iteration of an iterating runner.
    pub fn count_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn archived(&self) -> &[FailureRecord] {
        &self.archived
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Failed cases plus archived failures.
    pub fn failure_count(&self) -> usize {
        self.cases
            .iter()
            .filter(|case| case.outcome.is_failure())
            .count()
            + self.archived.len()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Appends everything `other` collected.
    pub fn merge(&mut self, other: RunReport) {
        self.cases.extend(other.cases);
        self.archived.extend(other.archived);
        self.iterations += other.iterations;
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for case in self.cases.iter().filter(|case| case.outcome.is_failure()) {
            writeln!(f, "{}: {}", case.name, case.outcome)?;
        }
        for failure in &self.archived {
            writeln!(
                f,
                "iteration {}: input kept at {}",
                failure.iteration,
                failure.path.display()
            )?;
        }
        write!(
            f,
            "{} cases, {} iterations, {} failures",
            self.cases.len(),
            self.iterations,
            self.failure_count()
        )
    }
}

/// One row of a timing table.
///
/// `count` is the number of points for triangulation timings and the number of faces for
/// mesh growth timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub struct TimingSample {
    pub count: usize,
    pub duration: Duration,
}

impl TimingSample {
    pub fn new(count: usize, duration: Duration) -> Self {
        Self { count, duration }
    }

    pub fn to_csv_row(&self) -> String {
        format!("{}, {}", self.count, self.duration.as_secs_f64())
    }
}

/// The median of exactly [TIMING_RUNS] measurements.
pub fn median_of_runs(mut runs: [Duration; TIMING_RUNS]) -> Duration {
    runs.sort_unstable();
    runs[TIMING_RUNS / 2]
}

/// Writes timing samples to a CSV file as they arrive.
///
/// Every row is flushed immediately, so an interrupted run leaves all finished rows behind.
#[derive(Debug)]
pub struct TimingReport {
    path: PathBuf,
    writer: BufWriter<File>,
    samples: Vec<TimingSample>,
}

impl TimingReport {
    /// Creates (or truncates) the CSV file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, HarnessError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| HarnessError::io(parent, err))?;
            }
        }
        let file = File::create(&path).map_err(|err| HarnessError::io(&path, err))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            samples: Vec::new(),
        })
    }

    pub fn append(&mut self, sample: TimingSample) -> Result<(), HarnessError> {
        writeln!(self.writer, "{}", sample.to_csv_row())
            .and_then(|_| self.writer.flush())
            .map_err(|err| HarnessError::io(&self.path, err))?;
        self.samples.push(sample);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<TimingSample> {
        self.samples
    }
}
