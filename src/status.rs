//! Broker status codes.
//!
//! Every response payload starts with exactly one status code, encoded as a
//! 32-bit big-endian integer. Zero means success; any non-zero code tells the
//! client that the remaining payload fields are absent and must be ignored.
//!
//! The set is closed and the numeric values are stable: both ends of a
//! connection rely on them without negotiation. New codes get new values,
//! existing values are never reused.

use std::fmt;

/// Status code carried as the first payload field of every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum StatusCode {
    /// Operation succeeded; variant-specific fields follow.
    Ok = 0,
    /// Request was well-framed but semantically invalid.
    BadRequest = 1,
    /// The object the request referred to does not exist.
    NotFound = 2,
    /// The underlying filesystem operation failed with an I/O error.
    IoError = 3,
    /// The request violated the wire protocol.
    ProtocolError = 4,
    /// The request body ended before all expected fields were read.
    TruncatedRequest = 5,
    /// Declared payload size exceeds the connection limit.
    TooLarge = 6,
    /// The broker is shutting down and no longer accepts work.
    Shutdown = 7,
    /// Too many requests in flight; try again later.
    Busy = 8,
}

impl StatusCode {
    /// Wire value of this status code.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Whether this is the success code.
    #[inline]
    pub const fn is_ok(self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Look up a status code by its wire value.
    ///
    /// Returns `None` for values outside the closed set; callers surface
    /// unknown codes rather than inventing a meaning for them.
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(StatusCode::Ok),
            1 => Some(StatusCode::BadRequest),
            2 => Some(StatusCode::NotFound),
            3 => Some(StatusCode::IoError),
            4 => Some(StatusCode::ProtocolError),
            5 => Some(StatusCode::TruncatedRequest),
            6 => Some(StatusCode::TooLarge),
            7 => Some(StatusCode::Shutdown),
            8 => Some(StatusCode::Busy),
            _ => None,
        }
    }

    /// Human-readable text for this status code.
    pub const fn text(self) -> &'static str {
        match self {
            StatusCode::Ok => "ok",
            StatusCode::BadRequest => "bad request",
            StatusCode::NotFound => "not found",
            StatusCode::IoError => "i/o error",
            StatusCode::ProtocolError => "protocol error",
            StatusCode::TruncatedRequest => "truncated request",
            StatusCode::TooLarge => "request too large",
            StatusCode::Shutdown => "broker shutting down",
            StatusCode::Busy => "too many requests in flight",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text(), self.code())
    }
}

impl From<StatusCode> for u32 {
    fn from(code: StatusCode) -> u32 {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [StatusCode; 9] = [
        StatusCode::Ok,
        StatusCode::BadRequest,
        StatusCode::NotFound,
        StatusCode::IoError,
        StatusCode::ProtocolError,
        StatusCode::TruncatedRequest,
        StatusCode::TooLarge,
        StatusCode::Shutdown,
        StatusCode::Busy,
    ];

    #[test]
    fn test_success_is_zero() {
        assert_eq!(StatusCode::Ok.code(), 0);
        assert!(StatusCode::Ok.is_ok());
    }

    #[test]
    fn test_nonzero_codes_are_not_ok() {
        for code in ALL.iter().filter(|c| !c.is_ok()) {
            assert_ne!(code.code(), 0, "{:?} must be non-zero", code);
        }
    }

    #[test]
    fn test_from_code_roundtrip() {
        for code in ALL {
            assert_eq!(StatusCode::from_code(code.code()), Some(code));
        }
    }

    #[test]
    fn test_from_code_unknown() {
        assert_eq!(StatusCode::from_code(9999), None);
        assert_eq!(StatusCode::from_code(u32::MAX), None);
    }

    #[test]
    fn test_values_are_stable() {
        // Wire values; changing any of these breaks deployed clients.
        assert_eq!(StatusCode::Ok.code(), 0);
        assert_eq!(StatusCode::BadRequest.code(), 1);
        assert_eq!(StatusCode::NotFound.code(), 2);
        assert_eq!(StatusCode::IoError.code(), 3);
        assert_eq!(StatusCode::ProtocolError.code(), 4);
        assert_eq!(StatusCode::TruncatedRequest.code(), 5);
        assert_eq!(StatusCode::TooLarge.code(), 6);
        assert_eq!(StatusCode::Shutdown.code(), 7);
        assert_eq!(StatusCode::Busy.code(), 8);
    }

    #[test]
    fn test_text_is_nonempty() {
        for code in ALL {
            assert!(!code.text().is_empty());
        }
    }

    #[test]
    fn test_display_includes_value() {
        let s = StatusCode::NotFound.to_string();
        assert!(s.contains("not found"));
        assert!(s.contains('2'));
    }
}
