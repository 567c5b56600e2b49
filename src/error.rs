//! Rich diagnostic error types for destino.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives; `DestinoError` wraps them transparently so error codes and help
//! text survive up to the CLI.

use miette::Diagnostic;
use thiserror::Error;

use crate::advisor::AdvisorError;
use crate::chain::ChainError;
use crate::config::ConfigError;
use crate::knowledge::KnowledgeError;

/// Top-level error type.
#[derive(Debug, Error, Diagnostic)]
pub enum DestinoError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Knowledge(#[from] KnowledgeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Advisor(#[from] AdvisorError),
}

/// Convenience result type.
pub type DestinoResult<T> = std::result::Result<T, DestinoError>;
