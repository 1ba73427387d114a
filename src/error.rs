//! Error types for the gridseek command line

use gridseek_core::GridseekError;
use thiserror::Error;

/// Errors that can occur in the gridseek binary
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("invalid cell reference '{0}'")]
    InvalidCell(String),

    #[error("invalid range '{0}'")]
    InvalidRange(String),

    #[error("range {0} covers a single cell; select at least two")]
    SingleCell(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] GridseekError),
}

pub type Result<T> = std::result::Result<T, CliError>;
