//! Error types for bufferbci
//!
//! Provides a unified error type for all buffer operations.

use thiserror::Error;

use crate::protocol::Command;

/// Result type alias using BufferError
pub type Result<T> = std::result::Result<T, BufferError>;

/// Unified error type for buffer client operations
#[derive(Debug, Error)]
pub enum BufferError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: expected {expected}, received 0x{received:03x}")]
    UnexpectedCommand { expected: Command, received: u16 },

    #[error("Protocol error: unknown sample data type {0}")]
    UnknownDataType(u32),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BufferError {
    /// True for any error caused by a malformed or unexpected server response
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            BufferError::UnexpectedCommand { .. }
                | BufferError::UnknownDataType(_)
                | BufferError::Protocol(_)
        )
    }

    /// True when the byte stream can no longer be trusted after this error
    pub fn breaks_connection(&self) -> bool {
        matches!(self, BufferError::Transport(_)) || self.is_protocol()
    }
}
