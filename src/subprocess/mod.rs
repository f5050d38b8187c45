pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;


pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockProcessRunner, MockResponse};
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner};

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Runs external tools on behalf of the pipeline.
///
/// Dry-run is a property of the runner rather than of each call: a dry-run
/// runner logs every command line and reports success without touching the
/// underlying [`ProcessRunner`].
#[derive(Clone)]
pub struct CommandRunner {
    runner: Arc<dyn ProcessRunner>,
    dry_run: bool,
    timeout: Option<Duration>,
}

impl CommandRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>, dry_run: bool) -> Self {
        Self {
            runner,
            dry_run,
            timeout: None,
        }
    }

    pub fn production(dry_run: bool) -> Self {
        Self::new(Arc::new(TokioProcessRunner), dry_run)
    }

    /// Runner backed by a mock, returning the mock for expectations.
    pub fn mock(dry_run: bool) -> (Self, MockProcessRunner) {
        let mock = MockProcessRunner::new();
        let runner = Arc::new(mock.clone()) as Arc<dyn ProcessRunner>;
        (Self::new(runner, dry_run), mock)
    }

    /// Default timeout for commands that do not set their own.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run a command and return its exit status.
    ///
    /// A non-zero status is logged as an error but returned as `Ok`; use
    /// [`CommandRunner::run_checked`] to treat it as a failure.
    pub async fn run(&self, command: ProcessCommand) -> Result<ExitStatus, ProcessError> {
        Ok(self.execute(command).await?.status)
    }

    /// Run a command and fail unless it exits successfully.
    pub async fn run_checked(&self, command: ProcessCommand) -> Result<(), ProcessError> {
        let display = command.display();
        let status = self.run(command).await?;
        if status.success() {
            Ok(())
        } else {
            Err(ProcessError::Failed {
                command: display,
                status,
            })
        }
    }

    /// Run a command for its stdout. Returns `None` in dry-run mode.
    pub async fn capture(&self, command: ProcessCommand) -> Result<Option<String>, ProcessError> {
        if self.dry_run {
            self.log_dry_run(&command);
            return Ok(None);
        }

        let display = command.display();
        let output = self.execute(command).await?;
        if !output.status.success() {
            return Err(ProcessError::Failed {
                command: display,
                status: output.status,
            });
        }
        Ok(Some(output.stdout))
    }

    async fn execute(&self, mut command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        if self.dry_run {
            self.log_dry_run(&command);
            return Ok(ProcessOutput {
                status: ExitStatus::Success,
                stdout: String::new(),
                stderr: String::new(),
                duration: Duration::ZERO,
            });
        }

        let cmd_display = command.display();
        if command.echo {
            info!("Running: {}", cmd_display);
        }
        if command.timeout.is_none() {
            command.timeout = self.timeout;
        }
        let suppress_stdout = command.suppress_stdout;

        let output = self.runner.run(command).await?;

        if !output.status.success() {
            error!("cmd: {}\n Failed with {}", cmd_display, output.status);
        }
        let stdout = output.stdout.trim_end();
        if !stdout.is_empty() {
            if suppress_stdout {
                debug!("{}", stdout);
            } else {
                info!("{}", stdout);
            }
        }
        let stderr = output.stderr.trim_end();
        if !stderr.is_empty() {
            warn!("{}", stderr);
        }

        Ok(output)
    }

    fn log_dry_run(&self, command: &ProcessCommand) {
        if command.echo {
            info!("Running: {}", command.display());
        }
        info!("Doing a dryrun");
    }
}
