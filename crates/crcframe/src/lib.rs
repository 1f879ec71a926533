//! Versioned, typed binary frames with CRC-32 integrity checks.
//!
//! crcframe turns a `(version, kind, payload)` record into a self-describing
//! byte sequence and back, rejecting truncated or corrupted input.
//!
//! # Crate Structure
//!
//! - [`codec`] — Frame encoding/decoding, blocking reader/writer, and the
//!   `tokio_util` codec (behind `async` feature)

/// Re-export codec types.
pub mod codec {
    pub use crcframe_codec::*;
}

pub use crcframe_codec::{decode, encode, Frame, FrameError};
