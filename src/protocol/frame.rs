//! Frame struct with typed accessors.
//!
//! Represents a complete protocol frame with header and payload.
//! Uses `bytes::Bytes` so the payload can be shared without copying.

use bytes::Bytes;

use super::wire_format::{Header, HEADER_SIZE};

/// A complete protocol frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Decoded header.
    pub header: Header,
    /// Payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from header and payload.
    pub fn new(header: Header, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Get the command.
    #[inline]
    pub fn command(&self) -> u16 {
        self.header.command
    }

    /// Get the correlation id.
    #[inline]
    pub fn correlation_id(&self) -> u32 {
        self.header.correlation_id
    }

    /// Check if this is a response.
    #[inline]
    pub fn is_response(&self) -> bool {
        self.header.is_response()
    }

    /// Read the leading status code of a response payload.
    ///
    /// Every response payload begins with a 32-bit Big Endian status code.
    /// Returns `None` if the payload is shorter than 4 bytes.
    pub fn status_code(&self) -> Option<u32> {
        let b = self.payload.get(0..4)?;
        Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Payload bytes following the status code.
    pub fn status_body(&self) -> &[u8] {
        self.payload.get(4..).unwrap_or(&[])
    }
}

/// Encode a complete frame as a single byte vector.
///
/// Used by clients and tests to assemble request frames; responses are
/// normally built through [`ResponseBuf`](super::ResponseBuf), which enforces
/// the declared payload size.
pub fn encode_frame(header: &Header, payload: &[u8]) -> Vec<u8> {
    debug_assert_eq!(header.payload_length as usize, payload.len());
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let header = Header::request(1, 42, 5);
        let payload = Bytes::from_static(b"hello");
        let frame = Frame::new(header, payload);

        assert_eq!(frame.command(), 1);
        assert_eq!(frame.correlation_id(), 42);
        assert_eq!(frame.payload(), b"hello");
        assert_eq!(frame.payload_len(), 5);
        assert!(!frame.is_response());
    }

    #[test]
    fn test_frame_empty_payload() {
        let header = Header::request(1, 1, 0);
        let frame = Frame::new(header, Bytes::new());

        assert_eq!(frame.payload_len(), 0);
        assert!(frame.payload().is_empty());
        assert_eq!(frame.status_code(), None);
    }

    #[test]
    fn test_status_code_accessor() {
        let request = Header::request(3, 9, 0);
        let header = Header::response_to(&request, 4);
        let frame = Frame::new(header, Bytes::from_static(&[0x00, 0x00, 0x00, 0x02]));

        assert!(frame.is_response());
        assert_eq!(frame.status_code(), Some(2));
        assert!(frame.status_body().is_empty());
    }

    #[test]
    fn test_status_body_after_code() {
        let request = Header::request(3, 9, 0);
        let header = Header::response_to(&request, 12);
        let mut payload = vec![0u8; 4]; // status 0
        payload.extend_from_slice(&4096u64.to_be_bytes());
        let frame = Frame::new(header, Bytes::from(payload));

        assert_eq!(frame.status_code(), Some(0));
        assert_eq!(frame.status_body(), 4096u64.to_be_bytes());
    }

    #[test]
    fn test_encode_frame() {
        let header = Header::request(1, 42, 5);
        let bytes = encode_frame(&header, b"hello");

        assert_eq!(bytes.len(), HEADER_SIZE + 5);

        // Parse it back
        let parsed_header = Header::decode(&bytes[..HEADER_SIZE]).unwrap();
        assert_eq!(parsed_header, header);
        assert_eq!(&bytes[HEADER_SIZE..], b"hello");
    }

    #[test]
    fn test_encode_frame_empty_payload() {
        let header = Header::request(1, 1, 0);
        let bytes = encode_frame(&header, b"");

        assert_eq!(bytes.len(), HEADER_SIZE);
    }
}
