//! Error types for brokerwire.

use thiserror::Error;

/// Main error type for all wire-layer operations.
#[derive(Debug, Error)]
pub enum WireError {
    /// I/O error while writing frames to the connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protocol error (invalid header, reserved bits, oversized payload, etc.).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An append would write past the buffer's declared payload capacity.
    #[error(
        "capacity exceeded: {written} of {capacity} payload bytes written, \
         appending {requested} more would overflow"
    )]
    CapacityExceeded {
        /// Declared payload capacity in bytes.
        capacity: usize,
        /// Payload bytes written so far.
        written: usize,
        /// Size of the rejected append.
        requested: usize,
    },

    /// Buffer sealed with fewer payload bytes than declared.
    #[error("payload size mismatch: declared {declared} bytes, wrote {written}")]
    PayloadSizeMismatch {
        /// Declared payload size in bytes.
        declared: usize,
        /// Payload bytes actually written.
        written: usize,
    },

    /// The callback has already produced its one response.
    #[error("response already sent for correlation id {0}")]
    AlreadyResponded(u32),

    /// Connection closed; the writer task is gone.
    #[error("connection closed")]
    ConnectionClosed,

    /// Write queue stayed full past the backpressure timeout.
    #[error("backpressure timeout")]
    BackpressureTimeout,
}

/// Result type alias using WireError.
pub type Result<T> = std::result::Result<T, WireError>;
