//! Response frame builder with a fixed, declared payload size.
//!
//! A [`ResponseBuf`] is created from a response header whose `payload_length`
//! declares exactly how many payload bytes will follow. The header is written
//! eagerly; typed append operations then fill the payload in Big Endian
//! order. Writing past the declared capacity fails deterministically, and
//! [`seal`](ResponseBuf::seal) refuses to produce a frame unless the payload
//! was filled exactly — a header/payload size mismatch would corrupt framing
//! for every later message on the connection.
//!
//! # Example
//!
//! ```
//! use brokerwire::protocol::{Header, ResponseBuf};
//! use brokerwire::StatusCode;
//!
//! let request = Header::request(4, 42, 0);
//! let mut buf = ResponseBuf::for_reply(&request, 12);
//! buf.append_status(StatusCode::Ok).unwrap();
//! buf.append_u64(4096).unwrap();
//! let frame = buf.seal().unwrap();
//! assert_eq!(frame.len(), 11 + 12);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire_format::{Header, HEADER_SIZE};
use crate::error::{Result, WireError};
use crate::status::StatusCode;

/// Writable buffer for one outgoing response frame.
///
/// Owned exclusively by the callback invocation that creates it; sealing
/// yields an immutable [`Bytes`] that is safe to hand to concurrent
/// transmission.
#[derive(Debug)]
pub struct ResponseBuf {
    buf: BytesMut,
    payload_capacity: usize,
}

impl ResponseBuf {
    /// Create a builder for the given response header.
    ///
    /// The header's `payload_length` is the declared capacity; the header
    /// bytes are written immediately.
    pub fn new(header: Header) -> Self {
        let payload_capacity = header.payload_length as usize;
        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload_capacity);
        buf.extend_from_slice(&header.encode());
        Self {
            buf,
            payload_capacity,
        }
    }

    /// Create a builder answering `request` with `payload_len` payload bytes.
    ///
    /// Derives the response header via [`Header::response_to`].
    pub fn for_reply(request: &Header, payload_len: u32) -> Self {
        Self::new(Header::response_to(request, payload_len))
    }

    /// Payload bytes written so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.buf.len() - HEADER_SIZE
    }

    /// Payload bytes still expected before the buffer can be sealed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.payload_capacity - self.written()
    }

    /// Check that `n` more bytes fit within the declared capacity.
    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(WireError::CapacityExceeded {
                capacity: self.payload_capacity,
                written: self.written(),
                requested: n,
            });
        }
        Ok(())
    }

    /// Append a 32-bit integer (Big Endian).
    pub fn append_u32(&mut self, value: u32) -> Result<()> {
        self.ensure(4)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Append a 64-bit integer (Big Endian).
    pub fn append_u64(&mut self, value: u64) -> Result<()> {
        self.ensure(8)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Append a signed 64-bit integer (Big Endian).
    pub fn append_i64(&mut self, value: i64) -> Result<()> {
        self.ensure(8)?;
        self.buf.extend_from_slice(&value.to_be_bytes());
        Ok(())
    }

    /// Append a status code as its 32-bit wire value.
    pub fn append_status(&mut self, code: StatusCode) -> Result<()> {
        self.append_u32(code.code())
    }

    /// Append raw bytes.
    pub fn append_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.ensure(data.len())?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Complete the frame.
    ///
    /// Fails unless the payload was filled to exactly the declared size.
    /// The returned [`Bytes`] is immutable; ownership transfers to the
    /// transport and this layer never touches the frame again.
    pub fn seal(self) -> Result<Bytes> {
        if self.written() != self.payload_capacity {
            return Err(WireError::PayloadSizeMismatch {
                declared: self.payload_capacity,
                written: self.written(),
            });
        }
        Ok(self.buf.freeze())
    }
}

/// Build a status-only success frame answering `request`.
pub fn ok_frame(request: &Header) -> Bytes {
    status_frame(request, StatusCode::Ok)
}

/// Build a status-only error frame answering `request`.
pub fn error_frame(request: &Header, code: StatusCode) -> Bytes {
    status_frame(request, code)
}

fn status_frame(request: &Header, code: StatusCode) -> Bytes {
    let mut buf = ResponseBuf::for_reply(request, 4);
    buf.append_status(code)
        .expect("status fits a status-only frame");
    buf.seal().expect("status-only frame is exactly 4 bytes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Frame;

    fn request() -> Header {
        Header::request(4, 42, 0)
    }

    #[test]
    fn test_header_written_eagerly() {
        let buf = ResponseBuf::for_reply(&request(), 12);
        assert_eq!(buf.written(), 0);
        assert_eq!(buf.remaining(), 12);
    }

    #[test]
    fn test_length_reply_layout() {
        // Length-query reply: status + u64 length, 12-byte payload.
        let mut buf = ResponseBuf::for_reply(&request(), 12);
        buf.append_status(StatusCode::Ok).unwrap();
        buf.append_u64(4096).unwrap();
        let frame = buf.seal().unwrap();

        assert_eq!(frame.len(), HEADER_SIZE + 12);

        let header = Header::decode(&frame).unwrap();
        assert_eq!(header.correlation_id, 42);
        assert_eq!(header.payload_length, 12);
        assert!(header.is_response());

        // status 0, then 4096 in BE
        assert_eq!(&frame[HEADER_SIZE..HEADER_SIZE + 4], &[0, 0, 0, 0]);
        assert_eq!(&frame[HEADER_SIZE + 4..], 4096u64.to_be_bytes());
    }

    #[test]
    fn test_append_beyond_capacity_fails() {
        let mut buf = ResponseBuf::for_reply(&request(), 12);
        buf.append_u32(0).unwrap();
        buf.append_u64(1).unwrap();

        // 12 declared, 12 written; one more u32 must fail.
        let err = buf.append_u32(7).unwrap_err();
        match err {
            WireError::CapacityExceeded {
                capacity,
                written,
                requested,
            } => {
                assert_eq!(capacity, 12);
                assert_eq!(written, 12);
                assert_eq!(requested, 4);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_append_leaves_buffer_usable() {
        let mut buf = ResponseBuf::for_reply(&request(), 8);
        buf.append_u32(1).unwrap();
        assert!(buf.append_u64(2).is_err());

        // The failed append wrote nothing; the remaining 4 bytes still fit.
        assert_eq!(buf.remaining(), 4);
        buf.append_u32(2).unwrap();
        assert!(buf.seal().is_ok());
    }

    #[test]
    fn test_seal_rejects_underfilled_payload() {
        let mut buf = ResponseBuf::for_reply(&request(), 12);
        buf.append_status(StatusCode::Ok).unwrap();

        let err = buf.seal().unwrap_err();
        match err {
            WireError::PayloadSizeMismatch { declared, written } => {
                assert_eq!(declared, 12);
                assert_eq!(written, 4);
            }
            other => panic!("expected PayloadSizeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_append_bytes() {
        let data = b"raw block contents";
        let mut buf = ResponseBuf::for_reply(&request(), 4 + data.len() as u32);
        buf.append_status(StatusCode::Ok).unwrap();
        buf.append_bytes(data).unwrap();
        let frame = buf.seal().unwrap();

        assert_eq!(&frame[HEADER_SIZE + 4..], data);
    }

    #[test]
    fn test_append_i64() {
        let mut buf = ResponseBuf::for_reply(&request(), 12);
        buf.append_status(StatusCode::Ok).unwrap();
        buf.append_i64(-1).unwrap();
        let frame = buf.seal().unwrap();

        assert_eq!(&frame[HEADER_SIZE + 4..], (-1i64).to_be_bytes());
    }

    #[test]
    fn test_empty_payload_declaration() {
        // A zero-length payload is legal at this layer; seal succeeds with
        // no appends.
        let buf = ResponseBuf::for_reply(&request(), 0);
        let frame = buf.seal().unwrap();
        assert_eq!(frame.len(), HEADER_SIZE);
    }

    #[test]
    fn test_ok_frame() {
        let frame = ok_frame(&request());
        let parsed = Frame::new(
            Header::decode(&frame).unwrap(),
            frame.slice(HEADER_SIZE..),
        );

        assert!(parsed.is_response());
        assert_eq!(parsed.correlation_id(), 42);
        assert_eq!(parsed.status_code(), Some(0));
        assert_eq!(parsed.payload_len(), 4);
    }

    #[test]
    fn test_error_frame_carries_only_the_code() {
        let frame = error_frame(&request(), StatusCode::NotFound);
        let parsed = Frame::new(
            Header::decode(&frame).unwrap(),
            frame.slice(HEADER_SIZE..),
        );

        assert_eq!(parsed.status_code(), Some(StatusCode::NotFound.code()));
        assert_eq!(parsed.payload_len(), 4);
        assert!(parsed.status_body().is_empty());
    }
}
