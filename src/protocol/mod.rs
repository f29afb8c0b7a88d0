//! Protocol module - wire format, framing, and frame building.
//!
//! Implements the binary response protocol shared by every broker request
//! type:
//! - 11-byte header encoding/decoding with request/response correlation
//! - Frame reassembly from partial reads
//! - Response buffer with a declared payload size and typed appends

mod frame;
mod frame_buffer;
mod response_buf;
mod wire_format;

pub use frame::{encode_frame, Frame};
pub use frame_buffer::FrameBuffer;
pub use response_buf::{error_frame, ok_frame, ResponseBuf};
pub use wire_format::{
    flags, Header, DEFAULT_MAX_PAYLOAD_SIZE, HEADER_SIZE, RESERVED_COMMAND,
};
