use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;

use crate::subprocess::ProcessCommand;

pub struct ProcessCommandBuilder {
    command: ProcessCommand,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            command: ProcessCommand {
                program: program.to_string(),
                args: Vec::new(),
                timeout: None,
                echo: true,
                suppress_stdout: false,
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.args.push(arg.to_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.command
            .args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Append a filesystem path argument.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.command.args.push(lossy(path.as_ref().as_os_str()));
        self
    }

    /// Append `<flag>=<path>`, the FSL long-option style.
    pub fn flag_path(mut self, flag: &str, path: impl AsRef<Path>) -> Self {
        self.command
            .args
            .push(format!("{}={}", flag, path.as_ref().display()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.command.timeout = Some(timeout);
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.command.echo = echo;
        self
    }

    /// Demote captured stdout to debug-level logging.
    pub fn suppress_stdout(mut self) -> Self {
        self.command.suppress_stdout = true;
        self
    }

    pub fn build(self) -> ProcessCommand {
        self.command
    }
}

fn lossy(value: &OsStr) -> String {
    value.to_string_lossy().into_owned()
}
