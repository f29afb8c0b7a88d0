//! Inbound request events.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;

use crate::protocol::{Frame, Header};

/// One received request, as delivered to a handler.
///
/// Immutable once constructed. The dispatch side owns the event and shares
/// it with the handler's [`ResponseCallback`](crate::ResponseCallback)
/// through an `Arc`; the callback never needs to reach back into the
/// dispatcher.
#[derive(Debug)]
pub struct InboundEvent {
    /// Decoded request header; its correlation id must be echoed in the
    /// response.
    pub header: Header,
    /// Address of the peer the response goes back to.
    pub addr: SocketAddr,
    /// Raw request payload.
    pub payload: Bytes,
}

impl InboundEvent {
    /// Create an event from its parts.
    pub fn new(header: Header, addr: SocketAddr, payload: Bytes) -> Arc<Self> {
        debug_assert_eq!(header.payload_length as usize, payload.len());
        Arc::new(Self {
            header,
            addr,
            payload,
        })
    }

    /// Create an event from a reassembled frame.
    pub fn from_frame(frame: Frame, addr: SocketAddr) -> Arc<Self> {
        Self::new(frame.header, addr, frame.payload)
    }

    /// Get the request's command.
    #[inline]
    pub fn command(&self) -> u16 {
        self.header.command
    }

    /// Get the request's correlation id.
    #[inline]
    pub fn correlation_id(&self) -> u32 {
        self.header.correlation_id
    }
}
