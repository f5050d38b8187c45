use std::path::PathBuf;
use thiserror::Error;

use crate::subprocess::ProcessError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{variable} is not set; pass {flag} or export {variable}")]
    MissingEnvironment {
        variable: &'static str,
        flag: &'static str,
    },

    #[error("FreeSurfer subject directory not found: {}", .0.display())]
    SubjectNotFound(PathBuf),

    #[error("Stage '{stage}' is missing required input {}", .path.display())]
    MissingInput { stage: String, path: PathBuf },

    #[error("Cannot add missing file {} to {}", .artifact.display(), .spec.display())]
    MissingArtifact { spec: PathBuf, artifact: PathBuf },

    #[error("Volume header has no '{field}' entry")]
    HeaderField { field: &'static str },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Exit code of the external command behind this error, if any.
    pub fn command_exit_code(&self) -> Option<i32> {
        match self {
            Error::Process(err) => err.exit_code(),
            Error::Stage { source, .. } => source.command_exit_code(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
