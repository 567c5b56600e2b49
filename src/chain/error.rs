//! Error types for the forward-chaining subsystem.
//!
//! Inference itself never fails: running out of rules, hitting the iteration
//! ceiling and detecting a repetition pattern are all normal halts. These
//! errors only cover building an engine from bad input.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from configuring the inference engine.
#[derive(Debug, Error, Diagnostic)]
pub enum ChainError {
    #[error("unknown conflict resolution strategy: \"{name}\"")]
    #[diagnostic(
        code(destino::chain::unknown_strategy),
        help("Valid strategies are: first, priority, refraction, random, general.")
    )]
    UnknownStrategy { name: String },

    #[error("invalid engine configuration: {message}")]
    #[diagnostic(
        code(destino::chain::invalid_config),
        help("Iteration ceiling and repetition window must both be greater than zero.")
    )]
    InvalidConfig { message: String },
}

/// Result type for chain operations.
pub type ChainResult<T> = std::result::Result<T, ChainError>;
