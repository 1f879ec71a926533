/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload does not fit the 16-bit length field (or the configured maximum).
    #[error("payload too large ({size} bytes, max {max})")]
    OversizedPayload { size: usize, max: usize },

    /// Fewer than 4 bytes were available for version, kind and length.
    #[error("truncated header ({available} of 4 bytes)")]
    TruncatedHeader { available: usize },

    /// The header announced more payload bytes than were available.
    #[error("truncated payload ({available} of {expected} bytes)")]
    TruncatedPayload { expected: usize, available: usize },

    /// The payload was complete but the trailing checksum was cut short.
    #[error("truncated checksum ({available} of 4 bytes)")]
    TruncatedChecksum { available: usize },

    /// The received checksum does not match the one computed over the frame.
    #[error("checksum mismatch (received {received:#010x}, computed {computed:#010x})")]
    ChecksumMismatch { received: u32, computed: u32 },

    /// Input continued past the checksum where an exact frame was required.
    #[error("{extra} trailing bytes after frame")]
    TrailingData { extra: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a frame started.
    #[error("connection closed")]
    ConnectionClosed,
}

impl FrameError {
    /// True for the three truncation variants.
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            FrameError::TruncatedHeader { .. }
                | FrameError::TruncatedPayload { .. }
                | FrameError::TruncatedChecksum { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
