// SPDX-License-Identifier: MIT

//! Typed error handling for decider-rs
//!
//! `PolicyError` is what the policy core reports; `DeciderError` wraps it
//! together with the failures of the surrounding binary (configuration,
//! I/O, JSON).

use thiserror::Error;

/// Top-level error type for decider-rs
#[derive(Debug, Error)]
pub enum DeciderError {
    /// Configuration errors (invalid env vars, bad listen address)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Policy parsing or evaluation errors
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DeciderError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Errors raised while parsing or running a policy graph
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    /// The DOT source could not be tokenized or parsed
    #[error("invalid policy dot: {0}")]
    InvalidSyntax(String),

    /// The DOT source parsed but declares no `start` node
    #[error("graph has no node named start")]
    NoStartNode,

    /// A guard condition failed validation or evaluation
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// Anything not covered above
    #[error("internal error: {0}")]
    Internal(String),
}

impl PolicyError {
    pub fn syntax(detail: impl Into<String>) -> Self {
        Self::InvalidSyntax(detail.into())
    }

    pub fn condition(detail: impl Into<String>) -> Self {
        Self::InvalidCondition(detail.into())
    }
}
