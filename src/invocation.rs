//! Running external tools and classifying how they terminated.

use std::process::{ExitStatus, Stdio};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{HarnessError, ToolCommand};

/// How an external tool terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde")
)]
pub enum InvocationStatus {
    /// The tool exited normally. `Exited(0)` is the only successful status.
    Exited(i32),
    /// The tool was terminated by the given signal.
    Signaled(i32),
}

impl InvocationStatus {
    /// Decodes a POSIX wait status.
    ///
    /// A non-zero low byte names the terminating signal (the core dump bit `0x80` is
    /// dropped); otherwise the second byte holds the exit code.
    pub fn from_raw(raw: i32) -> Self {
        if raw & 0xff != 0 {
            InvocationStatus::Signaled(raw & 0x7f)
        } else {
            InvocationStatus::Exited((raw >> 8) & 0xff)
        }
    }

    /// Classifies the status of a finished child process.
    ///
    /// This is the only place that knows how the platform encodes termination.
    #[cfg(unix)]
    pub fn from_exit_status(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        Self::from_raw(status.into_raw())
    }

    /// Classifies the status of a finished child process.
    ///
    /// This is the only place that knows how the platform encodes termination.
    #[cfg(not(unix))]
    pub fn from_exit_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => InvocationStatus::Exited(code),
            None => InvocationStatus::Signaled(-1),
        }
    }

    pub fn is_success(&self) -> bool {
        *self == InvocationStatus::Exited(0)
    }

    /// Returns `true` if the tool was killed by a signal.
    pub fn is_crash(&self) -> bool {
        matches!(self, InvocationStatus::Signaled(_))
    }

    /// Returns `true` if the tool exited normally with a non-zero code.
    pub fn is_logical_failure(&self) -> bool {
        matches!(self, InvocationStatus::Exited(code) if *code != 0)
    }

    /// Turns a crash into [HarnessError::Crashed], passing every other status through.
    pub fn check_crash(self, case: &str) -> Result<Self, HarnessError> {
        match self {
            InvocationStatus::Signaled(signal) => Err(HarnessError::Crashed {
                case: case.to_string(),
                signal,
            }),
            status => Ok(status),
        }
    }

    /// Requires success: crashes become [HarnessError::Crashed] and non-zero exit codes
    /// become [HarnessError::ToolFailed].
    pub fn require_success(self, case: &str) -> Result<(), HarnessError> {
        match self.check_crash(case)? {
            InvocationStatus::Exited(0) => Ok(()),
            InvocationStatus::Exited(code) => Err(HarnessError::ToolFailed {
                case: case.to_string(),
                code,
            }),
            InvocationStatus::Signaled(_) => unreachable!(),
        }
    }
}

/// The outcome of a run whose standard output was collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRun {
    pub status: InvocationStatus,
    pub stdout: String,
}

/// Runs tool commands.
///
/// Every call blocks until the tool has terminated. There are no retries: a runner that
/// wants another attempt issues another call.
pub trait ToolInvoker {
    /// Runs the command with inherited standard streams.
    fn run(&mut self, command: &ToolCommand) -> Result<InvocationStatus, HarnessError>;

    /// Runs the command and collects its standard output.
    fn run_captured(&mut self, command: &ToolCommand) -> Result<CapturedRun, HarnessError>;
}

impl<T: ToolInvoker + ?Sized> ToolInvoker for &mut T {
    fn run(&mut self, command: &ToolCommand) -> Result<InvocationStatus, HarnessError> {
        (**self).run(command)
    }

    fn run_captured(&mut self, command: &ToolCommand) -> Result<CapturedRun, HarnessError> {
        (**self).run_captured(command)
    }
}

/// Runs commands as child processes of the harness.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInvoker;

impl SystemInvoker {
    pub fn new() -> Self {
        SystemInvoker
    }
}

impl ToolInvoker for SystemInvoker {
    fn run(&mut self, command: &ToolCommand) -> Result<InvocationStatus, HarnessError> {
        tracing::debug!(%command, "running tool");
        let status = command
            .to_process()
            .status()
            .map_err(|source| spawn_error(command, source))?;
        let status = InvocationStatus::from_exit_status(status);
        tracing::debug!(?status, program = %command.program_name(), "tool finished");
        Ok(status)
    }

    fn run_captured(&mut self, command: &ToolCommand) -> Result<CapturedRun, HarnessError> {
        tracing::debug!(%command, "running tool with captured output");
        let output = command
            .to_process()
            .stdout(Stdio::piped())
            .output()
            .map_err(|source| spawn_error(command, source))?;
        let status = InvocationStatus::from_exit_status(output.status);
        tracing::debug!(?status, program = %command.program_name(), "tool finished");
        Ok(CapturedRun {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

fn spawn_error(command: &ToolCommand, source: std::io::Error) -> HarnessError {
    HarnessError::Spawn {
        program: command.program().to_string_lossy().into_owned(),
        source,
    }
}
