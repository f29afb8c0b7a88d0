//! Connection serving: reassemble request frames and hand events to a
//! handler.
//!
//! The broker's accept loop owns connection establishment; this module owns
//! what happens on an established connection: read bytes, reassemble frames,
//! wrap each request in an [`InboundEvent`] plus a single-use
//! [`ResponseCallback`], and spawn the handler. Handlers may complete in any
//! order; correlation ids in the response headers keep replies routable.
//!
//! Requests that cannot reach a handler still get answered - a semantically
//! invalid header is met with a protocol-error frame and a request arriving
//! over the in-flight limit with a busy frame - so a requester is never left
//! waiting on a connection that stays up.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Semaphore;

use crate::callback::ResponseCallback;
use crate::error::{Result, WireError};
use crate::event::InboundEvent;
use crate::protocol::{Frame, FrameBuffer, DEFAULT_MAX_PAYLOAD_SIZE};
use crate::status::StatusCode;
use crate::writer::SendHandle;

/// Default maximum concurrently running handlers per connection.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

/// Read buffer size for the connection loop.
const READ_BUF_SIZE: usize = 64 * 1024;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for request handlers.
///
/// A handler receives the event and its callback, computes whatever the
/// request asked for, and answers through the callback. The handler owns the
/// response contract: every invocation must end in exactly one
/// `respond`/`error` call.
pub trait EventHandler: Send + Sync + 'static {
    /// Handle one inbound event.
    fn handle(&self, event: Arc<InboundEvent>, cb: ResponseCallback) -> BoxFuture<'static, ()>;
}

/// Wrapper implementing [`EventHandler`] for an async closure.
struct FnHandler<F> {
    f: F,
}

impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Arc<InboundEvent>, ResponseCallback) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, event: Arc<InboundEvent>, cb: ResponseCallback) -> BoxFuture<'static, ()> {
        Box::pin((self.f)(event, cb))
    }
}

/// Adapt an async closure into an [`EventHandler`].
pub fn handler_fn<F, Fut>(f: F) -> impl EventHandler
where
    F: Fn(Arc<InboundEvent>, ResponseCallback) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    FnHandler { f }
}

/// Configuration for a connection's dispatch loop.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Maximum accepted payload declaration.
    pub max_payload_size: u32,
    /// Maximum concurrently running handlers.
    pub max_in_flight: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

/// Serve one established connection until EOF or a framing failure.
///
/// Returns `Ok(())` on orderly EOF. A reassembly error terminates the
/// connection: once framing integrity is lost, every later byte on the
/// stream is suspect and no well-formed response can be produced.
pub async fn serve_connection<R, H>(
    mut reader: R,
    peer: SocketAddr,
    handler: Arc<H>,
    sender: SendHandle,
    config: DispatchConfig,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    H: EventHandler + ?Sized,
{
    let semaphore = Arc::new(Semaphore::new(config.max_in_flight));
    let mut frames = FrameBuffer::with_max_payload(config.max_payload_size);
    let mut buf = vec![0u8; READ_BUF_SIZE];

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) => return Err(WireError::Io(e)),
        };

        let extracted = match frames.push(&buf[..n]) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::error!("dropping connection {}: {}", peer, e);
                return Err(e);
            }
        };

        for frame in extracted {
            dispatch_frame(frame, peer, &handler, &sender, &semaphore, &config).await;
        }
    }
}

/// Dispatch a single reassembled frame.
async fn dispatch_frame<H>(
    frame: Frame,
    peer: SocketAddr,
    handler: &Arc<H>,
    sender: &SendHandle,
    semaphore: &Arc<Semaphore>,
    config: &DispatchConfig,
) where
    H: EventHandler + ?Sized,
{
    // Only requests are dispatched; a client must not send us responses.
    if frame.is_response() {
        tracing::warn!("unexpected response frame from {}", peer);
        return;
    }

    let event = InboundEvent::from_frame(frame, peer);

    // Semantically invalid headers are answered, not dropped: the header
    // still decoded, so the reply is correlatable.
    if let Err(e) = event.header.validate(config.max_payload_size) {
        tracing::warn!("invalid request header from {}: {}", peer, e);
        answer_error(Arc::clone(&event), sender, StatusCode::ProtocolError).await;
        return;
    }

    let permit = match Arc::clone(semaphore).try_acquire_owned() {
        Ok(p) => p,
        Err(_) => {
            tracing::warn!(
                "in-flight limit reached, rejecting request {} from {}",
                event.correlation_id(),
                peer
            );
            answer_error(Arc::clone(&event), sender, StatusCode::Busy).await;
            return;
        }
    };

    let cb = ResponseCallback::new(Arc::clone(&event), sender.clone());
    let handler = Arc::clone(handler);

    tokio::spawn(async move {
        // Permit is held until the handler completes.
        let _permit = permit;
        handler.handle(event, cb).await;
    });
}

/// Answer an event with a status-only error frame.
async fn answer_error(event: Arc<InboundEvent>, sender: &SendHandle, code: StatusCode) {
    let correlation_id = event.correlation_id();
    let mut cb = ResponseCallback::new(event, sender.clone());
    if let Err(e) = cb.error(code).await {
        tracing::error!(
            "failed to send error response for request {}: {}",
            correlation_id,
            e
        );
    }
}
