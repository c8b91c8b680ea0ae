//! Error handling for Cubious
//!
//! This module provides the crate-wide error type. Subsystems with their own
//! failure vocabulary (persistence, network) define `thiserror` enums that
//! convert into `EngineError` at the boundary.

use std::error::Error as StdError;
use std::fmt;

/// Main error type for Cubious
#[derive(Debug)]
pub enum EngineError {
    // World Errors
    ResourceExhausted(String),

    // Persistence Errors
    SaveFailed {
        path: String,
        error: String,
    },
    LoadFailed {
        path: String,
        error: String,
    },
    CorruptedData {
        reason: String,
    },

    // Network Errors
    ConnectionFailed {
        addr: String,
        error: String,
    },
    ChannelClosed {
        name: String,
    },

    // Configuration Errors
    InvalidConfig {
        reason: String,
    },

    // System Errors
    IoError {
        path: String,
        error: String,
    },
    SerializationError {
        context: String,
        error: String,
    },
    DeserializationError {
        context: String,
        error: String,
    },

    // Generic fallback for unexpected errors
    Internal {
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::ResourceExhausted(msg) => write!(f, "Resource exhausted: {}", msg),

            EngineError::SaveFailed { path, error } => {
                write!(f, "Save failed for {}: {}", path, error)
            }
            EngineError::LoadFailed { path, error } => {
                write!(f, "Load failed for {}: {}", path, error)
            }
            EngineError::CorruptedData { reason } => write!(f, "Data corrupted: {}", reason),

            EngineError::ConnectionFailed { addr, error } => {
                write!(f, "Connection failed to {}: {}", addr, error)
            }
            EngineError::ChannelClosed { name } => write!(f, "Channel closed: {}", name),

            EngineError::InvalidConfig { reason } => write!(f, "Invalid config: {}", reason),

            EngineError::IoError { path, error } => write!(f, "IO error for {}: {}", path, error),
            EngineError::SerializationError { context, error } => {
                write!(f, "Serialization error in {}: {}", context, error)
            }
            EngineError::DeserializationError { context, error } => {
                write!(f, "Deserialization error in {}: {}", context, error)
            }

            EngineError::Internal { message } => write!(f, "Internal error: {}", message),
        }
    }
}

impl StdError for EngineError {}

/// Type alias for Results in Cubious
pub type EngineResult<T> = Result<T, EngineError>;

// Conversion traits for common error types

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::IoError {
            path: String::new(),
            error: error.to_string(),
        }
    }
}

impl From<crate::persistence::PersistenceError> for EngineError {
    fn from(err: crate::persistence::PersistenceError) -> Self {
        use crate::persistence::PersistenceError;
        match err {
            PersistenceError::SaveFailed { path, error } => EngineError::SaveFailed { path, error },
            PersistenceError::LoadFailed { path, error } => EngineError::LoadFailed { path, error },
            PersistenceError::IoError(e) => EngineError::IoError {
                path: String::new(),
                error: e.to_string(),
            },
            PersistenceError::SerializationError(e) => EngineError::SerializationError {
                context: "persistence".to_string(),
                error: e,
            },
            PersistenceError::DeserializationError(e) => EngineError::DeserializationError {
                context: "persistence".to_string(),
                error: e,
            },
            PersistenceError::CorruptedData(e) => EngineError::CorruptedData { reason: e },
        }
    }
}

impl From<crate::network::NetworkError> for EngineError {
    fn from(err: crate::network::NetworkError) -> Self {
        use crate::network::NetworkError;
        match err {
            NetworkError::ConnectionFailed { addr, error } => {
                EngineError::ConnectionFailed { addr, error }
            }
            NetworkError::Disconnected => EngineError::ChannelClosed {
                name: "transport".to_string(),
            },
            NetworkError::Io(e) => EngineError::IoError {
                path: String::new(),
                error: e.to_string(),
            },
        }
    }
}

// Helper functions for common error patterns

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    fn context(self, msg: &str) -> EngineResult<T>;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn context(self, msg: &str) -> EngineResult<T> {
        self.map_err(|e| EngineError::Internal {
            message: format!("{}: {}", msg, e),
        })
    }
}
