//! Pipeline error types.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use vpipe_client::ClientError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Service(#[from] ClientError),

    #[error("Missing precondition file: {}", path.display())]
    MissingPrecondition { path: PathBuf },

    #[error("Invalid edit script at {}: {source}", path.display())]
    InvalidScript {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filesystem error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure category reported in an error outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    RemoteRejected,
    MalformedResponse,
    MissingPrecondition,
    InvalidScript,
    Storage,
    Configuration,
}

impl PipelineError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Service(ClientError::Network { .. }) => ErrorKind::Network,
            PipelineError::Service(ClientError::Rejected { .. }) => ErrorKind::RemoteRejected,
            PipelineError::Service(ClientError::Malformed { .. }) => ErrorKind::MalformedResponse,
            PipelineError::Service(ClientError::Config(_)) => ErrorKind::Configuration,
            PipelineError::MissingPrecondition { .. } => ErrorKind::MissingPrecondition,
            PipelineError::InvalidScript { .. } => ErrorKind::InvalidScript,
            PipelineError::Storage { .. } => ErrorKind::Storage,
        }
    }
}
