use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: version (1) + kind (1) + length (2) = 4 bytes.
pub const HEADER_SIZE: usize = 4;

/// Trailing CRC-32: 4 bytes.
pub const CHECKSUM_SIZE: usize = 4;

/// Fixed bytes added to every payload on the wire.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD: usize = u16::MAX as usize;

/// A versioned, typed frame.
///
/// `version` and `kind` are opaque to the codec. The payload is owned by the
/// frame and never borrows from the buffer it was decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Caller-assigned format version.
    pub version: u8,
    /// Caller-assigned type tag.
    pub kind: u8,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(version: u8, kind: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            version,
            kind,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + checksum).
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }
}

/// The fixed-size fields at the start of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    pub kind: u8,
    pub length: u16,
}

impl Header {
    /// Payload length announced by the header.
    pub fn payload_len(&self) -> usize {
        usize::from(self.length)
    }

    /// Number of bytes the whole frame occupies on the wire.
    pub fn frame_len(&self) -> usize {
        self.payload_len() + FRAME_OVERHEAD
    }
}

/// CRC-32 (IEEE, reflected 0xEDB88320), the checksum zlib and gzip use.
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Encode a frame into a freshly allocated buffer.
///
/// Wire format:
/// ```text
/// ┌─────────┬────────┬───────────┬────────────────┬─────────────┐
/// │ Version │ Kind   │ Length    │ Payload        │ CRC-32      │
/// │ (1B)    │ (1B)   │ (2B BE)   │ (Length bytes) │ (4B BE)     │
/// └─────────┴────────┴───────────┴────────────────┴─────────────┘
/// ```
/// The checksum covers every byte before it.
pub fn encode(frame: &Frame) -> Result<Bytes> {
    let mut dst = BytesMut::with_capacity(frame.wire_size());
    encode_into(frame, &mut dst)?;
    Ok(dst.freeze())
}

/// Append the wire encoding of `frame` to `dst`.
///
/// Nothing is written when the payload is oversized.
pub fn encode_into(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    put_frame(frame.version, frame.kind, &frame.payload, dst)
}

pub(crate) fn put_frame(version: u8, kind: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let length = u16::try_from(payload.len()).map_err(|_| FrameError::OversizedPayload {
        size: payload.len(),
        max: MAX_PAYLOAD,
    })?;

    let start = dst.len();
    dst.reserve(FRAME_OVERHEAD + payload.len());
    dst.put_u8(version);
    dst.put_u8(kind);
    dst.put_u16(length);
    dst.put_slice(payload);
    let crc = checksum(&dst[start..]);
    dst.put_u32(crc);
    Ok(())
}

/// Parse the 4-byte header without looking at payload or checksum.
pub fn peek_header(src: &[u8]) -> Result<Header> {
    if src.len() < HEADER_SIZE {
        return Err(FrameError::TruncatedHeader {
            available: src.len(),
        });
    }

    let mut buf = &src[..HEADER_SIZE];
    Ok(Header {
        version: buf.get_u8(),
        kind: buf.get_u8(),
        length: buf.get_u16(),
    })
}

/// Decode one frame from the start of `src`.
///
/// Bytes after the checksum are left alone, so `src` may hold further data.
pub fn decode(src: &[u8]) -> Result<Frame> {
    decode_prefix(src).map(|(frame, _)| frame)
}

/// Decode one frame that must span all of `src`.
pub fn decode_exact(src: &[u8]) -> Result<Frame> {
    let (frame, consumed) = decode_prefix(src)?;
    if consumed != src.len() {
        return Err(FrameError::TrailingData {
            extra: src.len() - consumed,
        });
    }
    Ok(frame)
}

/// Decode one frame from the start of `src` and report how many bytes it used.
pub fn decode_prefix(src: &[u8]) -> Result<(Frame, usize)> {
    let header = peek_header(src)?;

    let payload_end = HEADER_SIZE + header.payload_len();
    if src.len() < payload_end {
        return Err(FrameError::TruncatedPayload {
            expected: header.payload_len(),
            available: src.len() - HEADER_SIZE,
        });
    }

    let frame_end = payload_end + CHECKSUM_SIZE;
    if src.len() < frame_end {
        return Err(FrameError::TruncatedChecksum {
            available: src.len() - payload_end,
        });
    }

    // Recompute over the bytes as received, not over re-encoded fields.
    let received = (&src[payload_end..frame_end]).get_u32();
    let computed = checksum(&src[..payload_end]);
    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }

    let frame = Frame {
        version: header.version,
        kind: header.kind,
        payload: Bytes::copy_from_slice(&src[HEADER_SIZE..payload_end]),
    };
    Ok((frame, frame_end))
}

/// Decode a frame from a stream buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    let header = peek_header(src)?;
    if header.payload_len() > max_payload {
        return Err(FrameError::OversizedPayload {
            size: header.payload_len(),
            max: max_payload,
        });
    }

    let total = header.frame_len();
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None); // Need more data
    }

    let (frame, consumed) = decode_prefix(&src[..total])?;
    src.advance(consumed);
    Ok(Some(frame))
}

/// Configuration for frame readers, writers and the stream codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default and ceiling: 65535.
    pub max_payload_size: usize,
}

impl FrameConfig {
    /// Configuration with a payload limit, clamped to what the wire can carry.
    pub fn with_max_payload(max_payload_size: usize) -> Self {
        Self {
            max_payload_size: max_payload_size.min(MAX_PAYLOAD),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
        }
    }
}
