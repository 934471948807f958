use std::fs;
use std::path::Path;

use crate::{CapturedRun, HarnessError, InvocationStatus, ToolCommand, ToolInvoker, ToolOption};

type Script = Box<dyn FnMut(&ToolCommand) -> InvocationStatus>;

/// A [ToolInvoker] that answers from a closure instead of starting processes.
///
/// Every command is logged. Tools that would produce files can be imitated with
/// [touch_argument] and [touch_option].
pub struct ScriptedInvoker {
    script: Script,
    stdout: String,
    log: Vec<ToolCommand>,
}

impl ScriptedInvoker {
    pub fn new(script: impl FnMut(&ToolCommand) -> InvocationStatus + 'static) -> Self {
        Self {
            script: Box::new(script),
            stdout: String::new(),
            log: Vec::new(),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(|_| InvocationStatus::Exited(0))
    }

    /// Standard output returned by every captured run.
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn log(&self) -> &[ToolCommand] {
        &self.log
    }

    pub fn program_names(&self) -> Vec<String> {
        self.log.iter().map(ToolCommand::program_name).collect()
    }
}

impl ToolInvoker for ScriptedInvoker {
    fn run(&mut self, command: &ToolCommand) -> Result<InvocationStatus, HarnessError> {
        self.log.push(command.clone());
        Ok((self.script)(command))
    }

    fn run_captured(&mut self, command: &ToolCommand) -> Result<CapturedRun, HarnessError> {
        let status = self.run(command)?;
        Ok(CapturedRun {
            status,
            stdout: self.stdout.clone(),
        })
    }
}

/// Creates the file named by the positional argument at `index`.
pub fn touch_argument(command: &ToolCommand, index: usize) {
    let path = Path::new(&command.args()[index]);
    fs::write(path, command.program_name()).unwrap();
}

/// Creates the file named by the value of `option`, if the command carries it.
pub fn touch_option(command: &ToolCommand, option: ToolOption) -> bool {
    match command.option_value(option) {
        Some(path) => {
            fs::write(path, "golden").unwrap();
            true
        }
        None => false,
    }
}
