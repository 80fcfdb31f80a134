//! Registry and command error types.

use thiserror::Error;

use crate::host::HostError;

/// Errors raised at registration time.
///
/// These indicate a programming error in an extension module (or a broken
/// dynamically-defined command) and are intentionally hard failures: a
/// broken extension should fail loudly at startup rather than silently
/// disabling itself.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Command names must be non-empty, without whitespace or a leading slash
    #[error("invalid command name {0:?}: names must be non-empty with no whitespace or leading '/'")]
    InvalidName(String),

    /// Handler failed its registration-time contract check
    #[error("invalid handler for command {name:?}: {reason}")]
    InvalidHandler { name: String, reason: String },

    /// Completion provider failed its registration-time contract check
    #[error("invalid completions for command {name:?}: {reason}")]
    InvalidCompletions { name: String, reason: String },
}

/// Errors a command handler can surface to the host's error reporting.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The user invoked the command with unusable arguments
    #[error("{0}")]
    Usage(String),

    /// The command ran but could not complete
    #[error("{0}")]
    Failed(String),

    /// A host capability call failed
    #[error(transparent)]
    Host(#[from] HostError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

/// Result type alias for command handlers.
pub type CommandResult = Result<(), CommandError>;
