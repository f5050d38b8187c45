use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};

type ArgsMatcher = Box<dyn Fn(&[String]) -> bool + Send + Sync>;

/// Stand-in for FreeSurfer, FSL and Workbench.
///
/// Every command is logged. Each call is answered by the first scripted
/// response whose program (and argument matcher, if any) fits; a command
/// with no response fails with [`ProcessError::NotScripted`].
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    responses: Arc<Mutex<Vec<ScriptedResponse>>>,
    calls: Arc<Mutex<Vec<ProcessCommand>>>,
}

struct ScriptedResponse {
    program: String,
    matcher: Option<ArgsMatcher>,
    output: ProcessOutput,
}

/// One response being scripted; registered by [`MockResponse::finish`].
pub struct MockResponse {
    runner: MockProcessRunner,
    response: ScriptedResponse,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for `program`. It exits successfully with no
    /// output unless told otherwise.
    pub fn expect_command(&mut self, program: &str) -> MockResponse {
        MockResponse {
            runner: self.clone(),
            response: ScriptedResponse {
                program: program.to_string(),
                matcher: None,
                output: ProcessOutput {
                    status: ExitStatus::Success,
                    stdout: String::new(),
                    stderr: String::new(),
                    duration: Duration::ZERO,
                },
            },
        }
    }

    /// Accept any invocation of each program with a successful, silent exit.
    pub fn succeed_for(&mut self, programs: &[&str]) {
        for program in programs {
            self.expect_command(program).finish();
        }
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, program: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.program == program)
            .count()
    }

    /// Arguments of every call to the given `wb_command` subcommand.
    pub fn wb_calls(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|cmd| cmd.program == "wb_command")
            .filter(|cmd| cmd.args.first().map(String::as_str) == Some(subcommand))
            .map(|cmd| cmd.args.clone())
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.calls.lock().unwrap().push(command.clone());

        let responses = self.responses.lock().unwrap();
        responses
            .iter()
            .find(|r| {
                r.program == command.program
                    && r.matcher.as_ref().map_or(true, |m| m(&command.args))
            })
            .map(|r| r.output.clone())
            .ok_or_else(|| ProcessError::NotScripted(command.display()))
    }
}

impl MockResponse {
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.response.matcher = Some(Box::new(matcher));
        self
    }

    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        self.response.output.stdout = stdout.to_string();
        self
    }

    pub fn returns_stderr(mut self, stderr: &str) -> Self {
        self.response.output.stderr = stderr.to_string();
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        self.response.output.status = match code {
            0 => ExitStatus::Success,
            code => ExitStatus::Error(code),
        };
        self
    }

    pub fn finish(self) {
        self.runner.responses.lock().unwrap().push(self.response);
    }
}
