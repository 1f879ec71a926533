use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{decode, peek_header, Frame, FrameConfig, HEADER_SIZE};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Only the bytes of the current frame are pulled from the stream, so
/// whatever follows stays unread until the next call.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    done: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(HEADER_SIZE),
            config,
            done: false,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached before
    /// the first header byte. EOF inside a frame reports the truncated part.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.buf.clear();

        let got = self.fill(HEADER_SIZE)?;
        if got == 0 {
            return Err(FrameError::ConnectionClosed);
        }

        let header = peek_header(&self.buf)?;
        if header.payload_len() > self.config.max_payload_size {
            tracing::debug!(
                length = header.payload_len(),
                max = self.config.max_payload_size,
                "rejecting oversized frame"
            );
            return Err(FrameError::OversizedPayload {
                size: header.payload_len(),
                max: self.config.max_payload_size,
            });
        }

        self.fill(header.frame_len())?;
        let frame = decode(&self.buf).inspect_err(|err| {
            tracing::debug!(error = %err, "discarding malformed frame");
        })?;

        tracing::trace!(
            version = frame.version,
            kind = frame.kind,
            size = frame.payload.len(),
            "frame read"
        );
        Ok(frame)
    }

    /// Pull bytes until the buffer holds `target` bytes or the stream ends.
    fn fill(&mut self, target: usize) -> Result<usize> {
        self.buf.reserve(target.saturating_sub(self.buf.len()));
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        while self.buf.len() < target {
            let want = (target - self.buf.len()).min(READ_CHUNK_SIZE);
            let read = match self.inner.read(&mut chunk[..want]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                break;
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }

        Ok(self.buf.len())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config = FrameConfig::with_max_payload(max_payload_size);
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

/// Yields frames until clean EOF. Stops after the first error.
impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
