//! HTTP client for the remote pipeline services.
//!
//! One method per remote step: download, script generation, cropping and
//! final assembly. Every call is a single request; failures are reported as a
//! closed set of error kinds and never retried.

pub mod client;
pub mod error;

pub use client::{ServiceClient, ServiceClientConfig, ServiceStep};
pub use error::{ClientError, ClientResult};
