use std::time::Duration;

use super::runner::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("Process timed out after {timeout:?}: {command}")]
    Timeout { command: String, timeout: Duration },

    #[error("Command failed with {status}: {command}")]
    Failed { command: String, status: ExitStatus },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No scripted response for: {0}")]
    NotScripted(String),
}

impl ProcessError {
    /// Exit code of a command that ran to completion but failed.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Failed { status, .. } => status.code(),
            _ => None,
        }
    }
}
