//! Failure taxonomy for the collaborator contracts.
//!
//! Each error's `Display` output is the user-facing text written to a node's
//! info region, so messages are kept free of prefixes.

use thiserror::Error;

/// A malformed input value, reported as info text and never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The value itself is unacceptable.
    #[error("{0}")]
    Invalid(String),
    /// The validating service could not answer.
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

/// The build function rejected the collected arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BuildError {
    pub message: String,
}

impl BuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// The submission call rejected a built transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
