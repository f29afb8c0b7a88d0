//! Wire format encoding and decoding.
//!
//! Implements the 11-byte header shared by requests and responses:
//! ```text
//! ┌──────────┬───────┬─────────────┬──────────┐
//! │ Command  │ Flags │ Correlation │ Length   │
//! │ 2 bytes  │ 1 byte│ 4 bytes     │ 4 bytes  │
//! │ uint16 BE│       │ uint32 BE   │ uint32 BE│
//! └──────────┴───────┴─────────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. A response header echoes the
//! command and correlation id of the request it answers; the correlation id
//! is the only mechanism tying a reply to its request on a connection that
//! multiplexes many requests at once.

use crate::error::{Result, WireError};

/// Header size in bytes (fixed, exactly 11).
pub const HEADER_SIZE: usize = 11;

/// Default maximum payload size (64 MB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 67_108_864;

/// Reserved command code (never use).
pub const RESERVED_COMMAND: u16 = 0;

/// Flag constants for the protocol.
pub mod flags {
    /// Message type: response (1) or request (0).
    pub const IS_RESPONSE: u8 = 0b0000_0001;

    /// Reserved bits mask (bits 1-7).
    pub const RESERVED_MASK: u8 = 0b1111_1110;

    /// Check if a specific flag is set.
    #[inline]
    pub fn has_flag(flags: u8, flag: u8) -> bool {
        flags & flag != 0
    }
}

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Command identifier (1-65535, 0 reserved).
    pub command: u16,
    /// Flags byte (see `flags` module).
    pub flags: u8,
    /// Correlation identifier, echoed verbatim in the response.
    pub correlation_id: u32,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl Header {
    /// Create a request header.
    pub fn request(command: u16, correlation_id: u32, payload_length: u32) -> Self {
        Self {
            command,
            flags: 0,
            correlation_id,
            payload_length,
        }
    }

    /// Derive the response header for a request.
    ///
    /// Copies the request's command and correlation id, sets the response
    /// flag, and records the declared payload length. The correlation
    /// identity is never fabricated here; it always comes from the request.
    ///
    /// # Panics
    ///
    /// Deriving a response from a header that is itself a response is a
    /// programming error in the broker and panics in debug builds.
    pub fn response_to(request: &Header, payload_length: u32) -> Self {
        debug_assert!(
            !request.is_response(),
            "cannot derive a response header from a response"
        );
        Self {
            command: request.command,
            flags: flags::IS_RESPONSE,
            correlation_id: request.correlation_id,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the buffer is smaller than `HEADER_SIZE`.
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0..2].copy_from_slice(&self.command.to_be_bytes());
        buf[2] = self.flags;
        buf[3..7].copy_from_slice(&self.correlation_id.to_be_bytes());
        buf[7..11].copy_from_slice(&self.payload_length.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if the buffer is too short.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            command: u16::from_be_bytes([buf[0], buf[1]]),
            flags: buf[2],
            correlation_id: u32::from_be_bytes([buf[3], buf[4], buf[5], buf[6]]),
            payload_length: u32::from_be_bytes([buf[7], buf[8], buf[9], buf[10]]),
        })
    }

    /// Validate the header for protocol compliance.
    ///
    /// Checks:
    /// - Command is not 0 (reserved)
    /// - Payload length doesn't exceed max
    /// - Reserved flag bits are 0
    pub fn validate(&self, max_payload_size: u32) -> Result<()> {
        if self.command == RESERVED_COMMAND {
            return Err(WireError::Protocol("command 0 is reserved".to_string()));
        }

        if self.payload_length > max_payload_size {
            return Err(WireError::Protocol(format!(
                "payload size {} exceeds maximum {}",
                self.payload_length, max_payload_size
            )));
        }

        if self.flags & flags::RESERVED_MASK != 0 {
            return Err(WireError::Protocol(
                "reserved flag bits must be 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        flags::has_flag(self.flags, flags::IS_RESPONSE)
    }
}
