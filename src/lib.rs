//! # brokerwire
//!
//! Response framing and correlation layer for a distributed filesystem
//! broker.
//!
//! The broker receives requests (open, read, write, length queries, ...)
//! over a connection-oriented transport, processes them asynchronously, and
//! must answer each one with exactly one correctly framed response - or an
//! error - correlated back to the request. This crate is that shared
//! protocol layer: header construction and correlation, response buffer
//! layout, status-code encoding, and the per-request callback that binds a
//! deferred result to its wire reply. Filesystem semantics and connection
//! management live elsewhere.
//!
//! ## Architecture
//!
//! - **`protocol`**: 11-byte header codec, frame reassembly, and the
//!   declared-size response buffer
//! - **`status`**: the closed status-code taxonomy every response leads with
//! - **`callback`**: single-use response callbacks over a closed set of
//!   reply shapes
//! - **`writer`**: per-connection writer task; the transport hand-off
//! - **`dispatch`**: serve loop wiring reassembled requests to handlers
//!
//! ## Example
//!
//! ```ignore
//! use brokerwire::{handler_fn, serve_connection, DispatchConfig};
//! use brokerwire::writer::spawn_writer_task_default;
//!
//! let (sender, _writer) = spawn_writer_task_default(write_half);
//! let handler = Arc::new(handler_fn(|event, mut cb| async move {
//!     match broker.length_of(&event.payload) {
//!         Ok(len) => { let _ = cb.respond_length(len).await; }
//!         Err(code) => { let _ = cb.error(code).await; }
//!     }
//! }));
//! serve_connection(read_half, peer, handler, sender, DispatchConfig::default()).await?;
//! ```

pub mod callback;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod protocol;
pub mod status;
pub mod writer;

pub use callback::{Reply, ResponseCallback};
pub use dispatch::{handler_fn, serve_connection, DispatchConfig, EventHandler};
pub use error::{Result, WireError};
pub use event::InboundEvent;
pub use status::StatusCode;
pub use writer::{SendHandle, WriterConfig};
