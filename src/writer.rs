//! Dedicated writer task for outgoing response frames.
//!
//! Completed frames are handed to a writer task through an mpsc channel
//! rather than through a shared `Arc<Mutex<W>>`, so concurrent callbacks
//! never contend on a lock:
//!
//! ```text
//! Callback 1 ─┐
//! Callback 2 ─┼─► mpsc::Sender<OutboundFrame> ─► Writer Task ─► Connection
//! Callback N ─┘
//! ```
//!
//! The channel hand-off is the single point where this layer may queue;
//! frame construction itself is pure in-memory work. Pending-frame
//! accounting provides backpressure when the connection drains slower than
//! handlers produce. Send failures are reported to the caller, never
//! retried or swallowed here.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Result, WireError};

/// Default maximum pending frames before backpressure kicks in.
pub const DEFAULT_MAX_PENDING_FRAMES: usize = 1024;

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default backpressure timeout.
pub const DEFAULT_BACKPRESSURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between backpressure checks.
const CHECK_INTERVAL: Duration = Duration::from_micros(100);

/// A sealed frame addressed to the peer it answers.
#[derive(Debug)]
pub struct OutboundFrame {
    /// Destination address (the originating event's sender).
    pub addr: SocketAddr,
    /// Complete frame bytes, header + payload, immutable.
    pub frame: Bytes,
}

impl OutboundFrame {
    /// Create a new outbound frame.
    #[inline]
    pub fn new(addr: SocketAddr, frame: Bytes) -> Self {
        Self { addr, frame }
    }

    /// Total size of this frame in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.frame.len()
    }
}

/// Configuration for the writer task.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Maximum pending frames before backpressure kicks in.
    pub max_pending_frames: usize,
    /// Channel capacity for the frame queue.
    pub channel_capacity: usize,
    /// Timeout when waiting for backpressure to clear.
    pub backpressure_timeout: Duration,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            max_pending_frames: DEFAULT_MAX_PENDING_FRAMES,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            backpressure_timeout: DEFAULT_BACKPRESSURE_TIMEOUT,
        }
    }
}

/// Handle for submitting frames to the writer task.
///
/// Cheaply cloneable; one clone per in-flight callback. This is the
/// "transport handle" shared across concurrent callbacks, and its thread
/// safety is this module's contract: sends may be enqueued concurrently
/// from any task.
#[derive(Clone)]
pub struct SendHandle {
    /// Channel sender for frames.
    tx: mpsc::Sender<OutboundFrame>,
    /// Pending frame count (for backpressure).
    pending: Arc<AtomicUsize>,
    /// Maximum pending frames.
    max_pending: usize,
    /// Backpressure timeout.
    timeout: Duration,
}

impl std::fmt::Debug for SendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendHandle")
            .field("pending", &self.pending_count())
            .field("max_pending", &self.max_pending)
            .finish()
    }
}

impl SendHandle {
    fn new(
        tx: mpsc::Sender<OutboundFrame>,
        pending: Arc<AtomicUsize>,
        max_pending: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            tx,
            pending,
            max_pending,
            timeout,
        }
    }

    /// Submit a frame for transmission.
    ///
    /// Waits if backpressure is active, timing out after the configured
    /// duration. Returns [`WireError::ConnectionClosed`] once the writer
    /// task is gone; pending callbacks observe the failure rather than
    /// having their responses silently dropped.
    pub async fn send(&self, frame: OutboundFrame) -> Result<()> {
        if self.pending.load(Ordering::Acquire) >= self.max_pending {
            self.wait_for_backpressure().await?;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);

        self.tx.send(frame).await.map_err(|_| {
            self.pending.fetch_sub(1, Ordering::Release);
            WireError::ConnectionClosed
        })
    }

    /// Try to submit a frame without waiting for backpressure.
    ///
    /// Returns `Err(BackpressureTimeout)` immediately if at capacity.
    pub fn try_send(&self, frame: OutboundFrame) -> Result<()> {
        if self.pending.load(Ordering::Acquire) >= self.max_pending {
            return Err(WireError::BackpressureTimeout);
        }

        self.pending.fetch_add(1, Ordering::AcqRel);

        self.tx.try_send(frame).map_err(|e| {
            self.pending.fetch_sub(1, Ordering::Release);
            match e {
                mpsc::error::TrySendError::Full(_) => WireError::BackpressureTimeout,
                mpsc::error::TrySendError::Closed(_) => WireError::ConnectionClosed,
            }
        })
    }

    /// Wait for backpressure to clear, with timeout.
    async fn wait_for_backpressure(&self) -> Result<()> {
        let start = Instant::now();

        loop {
            if self.pending.load(Ordering::Acquire) < self.max_pending {
                return Ok(());
            }

            if start.elapsed() > self.timeout {
                return Err(WireError::BackpressureTimeout);
            }

            tokio::time::sleep(CHECK_INTERVAL).await;
        }
    }

    /// Check if backpressure is currently active.
    #[inline]
    pub fn is_backpressure_active(&self) -> bool {
        self.pending.load(Ordering::Acquire) >= self.max_pending
    }

    /// Get the current pending frame count.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }
}

/// Spawn the writer task for one connection and return a send handle.
///
/// The returned `JoinHandle` resolves when the channel closes (all handles
/// dropped) or the connection write fails; the failure is the task's return
/// value, not a silent drop.
pub fn spawn_writer_task<W>(writer: W, config: WriterConfig) -> (SendHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(config.channel_capacity);
    let pending = Arc::new(AtomicUsize::new(0));

    let handle = SendHandle::new(
        tx,
        pending.clone(),
        config.max_pending_frames,
        config.backpressure_timeout,
    );

    let task = tokio::spawn(writer_loop(rx, writer, pending));

    (handle, task)
}

/// Spawn the writer task with default configuration.
pub fn spawn_writer_task_default<W>(writer: W) -> (SendHandle, JoinHandle<Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    spawn_writer_task(writer, WriterConfig::default())
}

/// Main writer loop - drains the channel onto the connection.
///
/// Frames already queued are flushed together; each frame is written whole,
/// so interleaved callbacks can never corrupt each other's framing.
async fn writer_loop<W>(
    mut rx: mpsc::Receiver<OutboundFrame>,
    mut writer: W,
    pending: Arc<AtomicUsize>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(first) = rx.recv().await {
        let mut drained = 1usize;
        if let Err(e) = writer.write_all(&first.frame).await {
            pending.fetch_sub(drained, Ordering::Release);
            tracing::error!("write to {} failed: {}", first.addr, e);
            return Err(WireError::Io(e));
        }

        // Drain whatever else is already queued before flushing once.
        while let Ok(next) = rx.try_recv() {
            drained += 1;
            if let Err(e) = writer.write_all(&next.frame).await {
                pending.fetch_sub(drained, Ordering::Release);
                tracing::error!("write to {} failed: {}", next.addr, e);
                return Err(WireError::Io(e));
            }
        }

        writer.flush().await?;
        pending.fetch_sub(drained, Ordering::Release);
    }

    // Channel closed, clean shutdown.
    Ok(())
}
