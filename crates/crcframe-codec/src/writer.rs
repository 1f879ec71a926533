use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{put_frame, Frame, FrameConfig, FRAME_OVERHEAD};
use crate::error::{FrameError, Result};

/// Sends frames over a blocking `Write` sink, one encoded frame per call.
///
/// Each frame is staged in an internal buffer, written out in full and
/// flushed before the call returns, so a reader on the other side never
/// observes half a frame from a single `send`.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Writer using the default 65535-byte payload limit.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Writer with a caller-chosen payload limit.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_OVERHEAD),
            config,
        }
    }

    /// Encode `frame` and push it out.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.version, frame.kind, frame.payload.as_ref())
    }

    /// Frame `payload` with `version`/`kind`, write it fully, then flush.
    ///
    /// Payloads above the configured limit fail with
    /// [`FrameError::OversizedPayload`] before anything reaches the sink.
    pub fn send(&mut self, version: u8, kind: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::OversizedPayload {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        put_frame(version, kind, payload, &mut self.buf)?;
        self.drain_buf()?;

        tracing::trace!(version, kind, size = payload.len(), "frame written");
        self.flush()
    }

    /// Flush the sink, retrying interrupted or would-block calls.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if is_retryable(&err) => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Hand back the sink. Every `send` has already flushed, so nothing is lost.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Change the payload limit for later sends (clamped to 65535).
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config = FrameConfig::with_max_payload(max_payload_size);
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    // A zero-length write means the peer is gone.
    fn drain_buf(&mut self) -> Result<()> {
        let mut written = 0usize;
        while written < self.buf.len() {
            match self.inner.write(&self.buf[written..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => written += n,
                Err(err) if is_retryable(&err) => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }
}

fn is_retryable(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock)
}
