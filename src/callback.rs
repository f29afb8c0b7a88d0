//! Per-request response callbacks.
//!
//! A [`ResponseCallback`] is created for exactly one [`InboundEvent`] and
//! produces exactly one wire reply: a success frame carrying one of the
//! [`Reply`] shapes, or a status-only error frame. The source system modeled
//! each reply shape as a subclass of a callback base class; here the shapes
//! are a closed sum type and the handler that computed the result picks the
//! variant.
//!
//! # Example
//!
//! ```ignore
//! async fn length(event: Arc<InboundEvent>, mut cb: ResponseCallback) {
//!     match broker.length(path_from(&event.payload)) {
//!         Ok(len) => cb.respond_length(len).await,
//!         Err(_) => cb.error(StatusCode::NotFound).await,
//!     }
//! }
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Result, WireError};
use crate::event::InboundEvent;
use crate::protocol::ResponseBuf;
use crate::status::StatusCode;
use crate::writer::{OutboundFrame, SendHandle};

/// Reply payload shapes, one per response variant.
///
/// This set is closed; every variant shares the common header and leading
/// status code, and differs only in the typed fields that follow.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Status-only acknowledgement (4-byte payload).
    Ok,
    /// A 64-bit length, e.g. answering a length query (12-byte payload).
    Length(u64),
    /// Opaque bytes, e.g. answering a read (4 + n byte payload).
    Data(Bytes),
}

impl Reply {
    /// Exact payload size of this reply, status code included.
    pub fn payload_len(&self) -> u32 {
        match self {
            Reply::Ok => 4,
            Reply::Length(_) => 4 + 8,
            Reply::Data(data) => 4 + data.len() as u32,
        }
    }

    /// Append this reply's typed fields after the status code.
    fn append_fields(&self, buf: &mut ResponseBuf) -> Result<()> {
        match self {
            Reply::Ok => Ok(()),
            Reply::Length(len) => buf.append_u64(*len),
            Reply::Data(data) => buf.append_bytes(data),
        }
    }
}

/// State of a callback instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallbackState {
    /// Holds its event, has not yet responded.
    Created,
    /// A success frame was submitted to the transport.
    Responded,
    /// An error frame was submitted to the transport.
    ErrorResponded,
}

/// Single-use callback binding a deferred result to one wire reply.
///
/// Created per inbound event; holds a shared reference to the event and a
/// clone of the connection's [`SendHandle`]. Both respond operations are
/// terminal: a second call returns [`WireError::AlreadyResponded`]. The
/// attempt is consumed even when the transport hand-off fails - retry policy
/// belongs to a layer that understands request idempotence, not here.
#[derive(Debug)]
pub struct ResponseCallback {
    event: Arc<InboundEvent>,
    sender: SendHandle,
    state: CallbackState,
}

impl ResponseCallback {
    /// Create a callback for one event on one connection.
    pub fn new(event: Arc<InboundEvent>, sender: SendHandle) -> Self {
        Self {
            event,
            sender,
            state: CallbackState::Created,
        }
    }

    /// The event this callback answers.
    #[inline]
    pub fn event(&self) -> &InboundEvent {
        &self.event
    }

    /// Correlation id of the originating request.
    #[inline]
    pub fn correlation_id(&self) -> u32 {
        self.event.correlation_id()
    }

    /// Destination address of the reply.
    #[inline]
    pub fn addr(&self) -> SocketAddr {
        self.event.addr
    }

    /// Whether a response has already been produced.
    #[inline]
    pub fn has_responded(&self) -> bool {
        self.state != CallbackState::Created
    }

    /// Consume the single response attempt, or reject a second one.
    fn take_turn(&mut self, next: CallbackState) -> Result<()> {
        if self.state != CallbackState::Created {
            return Err(WireError::AlreadyResponded(self.correlation_id()));
        }
        self.state = next;
        Ok(())
    }

    /// Send a success reply.
    ///
    /// Builds the correlated header, a payload of exactly the variant's
    /// size with status [`StatusCode::Ok`] first, and submits the sealed
    /// frame for the event's address. The transport outcome is returned to
    /// the caller unchanged; no retry is attempted here.
    pub async fn respond(&mut self, reply: Reply) -> Result<()> {
        self.take_turn(CallbackState::Responded)?;

        let mut buf = ResponseBuf::for_reply(&self.event.header, reply.payload_len());
        buf.append_status(StatusCode::Ok)?;
        reply.append_fields(&mut buf)?;
        let frame = buf.seal()?;

        self.sender
            .send(OutboundFrame::new(self.event.addr, frame))
            .await
    }

    /// Send a status-only success reply.
    pub async fn respond_ok(&mut self) -> Result<()> {
        self.respond(Reply::Ok).await
    }

    /// Send a 64-bit length reply.
    pub async fn respond_length(&mut self, length: u64) -> Result<()> {
        self.respond(Reply::Length(length)).await
    }

    /// Send a raw-data reply.
    pub async fn respond_data(&mut self, data: Bytes) -> Result<()> {
        self.respond(Reply::Data(data)).await
    }

    /// Send an error reply: the non-zero status code and nothing else.
    ///
    /// Passing [`StatusCode::Ok`] is rejected; success goes through
    /// [`respond`](Self::respond) so that every error frame is
    /// unambiguously status-only.
    pub async fn error(&mut self, code: StatusCode) -> Result<()> {
        if code.is_ok() {
            return Err(WireError::Protocol(
                "error response requires a non-zero status code".to_string(),
            ));
        }
        self.take_turn(CallbackState::ErrorResponded)?;

        let mut buf = ResponseBuf::for_reply(&self.event.header, 4);
        buf.append_status(code)?;
        let frame = buf.seal()?;

        self.sender
            .send(OutboundFrame::new(self.event.addr, frame))
            .await
    }
}

impl Drop for ResponseCallback {
    fn drop(&mut self) {
        // A callback dropped without responding leaves the requester waiting
        // until a transport-level timeout.
        if self.state == CallbackState::Created {
            tracing::warn!(
                "request {} (command {}) dropped without a response",
                self.correlation_id(),
                self.event.command(),
            );
        }
    }
}
