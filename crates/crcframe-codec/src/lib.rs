//! Versioned, typed binary framing with a CRC-32 integrity check.
//!
//! Every frame is laid out big-endian as:
//! - A 1-byte version
//! - A 1-byte kind tag
//! - A 2-byte payload length
//! - The payload
//! - A 4-byte CRC-32 (IEEE) over everything before it
//!
//! [`encode`] and [`decode`] are pure functions over in-memory buffers.
//! [`FrameReader`] and [`FrameWriter`] move single frames over blocking
//! streams, and the `async` feature adds a `tokio_util` codec.

pub mod codec;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod reader;
pub mod writer;

pub use codec::{
    checksum, decode, decode_exact, decode_frame, decode_prefix, encode, encode_into, peek_header,
    Frame, FrameConfig, Header, CHECKSUM_SIZE, FRAME_OVERHEAD, HEADER_SIZE, MAX_PAYLOAD,
};
pub use error::{FrameError, Result};
#[cfg(feature = "async")]
pub use framed::FrameCodec;
pub use reader::FrameReader;
pub use writer::FrameWriter;
