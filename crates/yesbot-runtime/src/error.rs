//! Runtime error types.

use thiserror::Error;
use yesbot_framework::RegistrationError;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// `run` was called while a previous run had already frozen the registry.
    #[error("Runtime already started")]
    AlreadyStarted,

    /// Services can only be provided before the runtime starts.
    #[error("Registry is frozen, cannot provide service '{0}'")]
    Frozen(&'static str),

    /// The receiving side of an event channel is gone.
    #[error("Event source closed")]
    SourceClosed,

    /// `try_send` found the event buffer full.
    #[error("Event buffer full")]
    BufferFull,

    #[error("Event source I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
