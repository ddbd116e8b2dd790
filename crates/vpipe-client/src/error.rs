//! Service client error types.

use thiserror::Error;

use crate::client::ServiceStep;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connect, TLS, timeout, reading the body).
    #[error("{step} request failed: {source}")]
    Network {
        step: ServiceStep,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status or an error envelope.
    #[error("{step} rejected: {message}")]
    Rejected {
        step: ServiceStep,
        status: Option<u16>,
        message: String,
    },

    /// The service answered 2xx but the body was not the expected JSON.
    #[error("{step} returned a malformed response: {detail}")]
    Malformed { step: ServiceStep, detail: String },

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    pub fn step(&self) -> Option<ServiceStep> {
        match self {
            ClientError::Network { step, .. }
            | ClientError::Rejected { step, .. }
            | ClientError::Malformed { step, .. } => Some(*step),
            ClientError::Config(_) => None,
        }
    }

    /// HTTP status of a rejection, if the service sent one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => *status,
            _ => None,
        }
    }
}
