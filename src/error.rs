//! Error types.
//!
//! Only caller mistakes are reported through these types. A robust estimation
//! that simply finds no acceptable model is not an error: it comes back as a
//! [`Report`](crate::core::Report) with `success == false`.

use std::path::PathBuf;

use thiserror::Error;

/// Precondition violations at the estimation API boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EstimationError {
    #[error("correspondence sets differ in length: {x} vs {y}")]
    MismatchedLengths { x: usize, y: usize },
    #[error("need at least {required} correspondences, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Failures while storing or loading a similarity transform.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read transform: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write transform: {0}")]
    Write(#[source] std::io::Error),
    #[error("invalid value {token:?} at position {index}")]
    Parse {
        index: usize,
        token: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("expected {expected} values, found {found}")]
    MissingValues { expected: usize, found: usize },
}
