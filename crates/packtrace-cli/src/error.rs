//! CLI error type and exit-code mapping.

use crate::Exit;
use packtrace_session::{ConfigError, SessionError};
use packtrace_types::TargetParseError;
use thiserror::Error;

/// Errors surfaced by the `packtrace` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid registry target: {0}")]
    Target(#[from] TargetParseError),

    #[error("{0}")]
    Session(#[from] SessionError),
}

impl CliError {
    /// Map to the process exit code.
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Config(_) | Self::Target(_) => Exit::ConfigError,
            Self::Session(_) => Exit::IoError,
        }
    }
}
