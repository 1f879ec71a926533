//! `tokio_util::codec` adapter for use with `FramedRead`/`FramedWrite`.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, decode_prefix, encode_into, Frame, FrameConfig};
use crate::error::{FrameError, Result};

/// Stream codec for back-to-back frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    config: FrameConfig,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        decode_frame(src, self.config.max_payload_size)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if src.is_empty() {
            return Ok(None);
        }

        // A partial frame is left; report which part is missing.
        let err = match decode_prefix(src) {
            Err(err) => err,
            Ok(_) => FrameError::ConnectionClosed,
        };
        tracing::debug!(error = %err, remaining = src.len(), "stream ended mid-frame");
        src.clear();
        Err(err)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        if frame.payload.len() > self.config.max_payload_size {
            return Err(FrameError::OversizedPayload {
                size: frame.payload.len(),
                max: self.config.max_payload_size,
            });
        }
        encode_into(&frame, dst)
    }
}

#[cfg(test)]
mod tests {
    use futures_util::{SinkExt, StreamExt};
    use tokio_util::codec::{FramedRead, FramedWrite};

    use super::*;
    use crate::codec::{encode, HEADER_SIZE};

    #[tokio::test]
    async fn sink_then_stream_roundtrip() {
        let (client, server) = tokio::io::duplex(64);
        let mut sink = FramedWrite::new(client, FrameCodec::new());
        let mut stream = FramedRead::new(server, FrameCodec::new());

        let writer = tokio::spawn(async move {
            for i in 0..10u8 {
                let payload = vec![i; usize::from(i) * 20];
                sink.send(Frame::new(1, i, payload)).await.unwrap();
            }
        });

        for i in 0..10u8 {
            let frame = stream.next().await.unwrap().unwrap();
            assert_eq!(frame.kind, i);
            assert_eq!(frame.payload.len(), usize::from(i) * 20);
        }

        writer.await.unwrap();
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn decoder_waits_for_whole_frame() {
        let wire = encode(&Frame::new(1, 1, &b"split"[..])).unwrap();
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();

        for byte in &wire[..wire.len() - 1] {
            buf.extend_from_slice(&[*byte]);
            assert!(codec.decode(&mut buf).unwrap().is_none());
        }
        buf.extend_from_slice(&wire[wire.len() - 1..]);
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(frame.payload.as_ref(), b"split");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_eof_reports_truncation() {
        let wire = encode(&Frame::new(1, 1, &b"cut short"[..])).unwrap();
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from(&wire[..HEADER_SIZE + 3]);

        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::TruncatedPayload {
                expected: 9,
                available: 3
            }
        ));
    }

    #[test]
    fn decode_eof_on_empty_buffer_is_none() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decoder_rejects_corruption() {
        let mut wire = encode(&Frame::new(1, 1, &b"abc"[..])).unwrap().to_vec();
        wire[4] ^= 0x01;
        let mut buf = BytesMut::from(wire.as_slice());

        let err = FrameCodec::new().decode(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::ChecksumMismatch { .. }));
    }

    #[test]
    fn encoder_respects_config_limit() {
        let mut codec = FrameCodec::with_config(FrameConfig::with_max_payload(2));
        let mut dst = BytesMut::new();

        let err = codec
            .encode(Frame::new(1, 1, &b"abc"[..]), &mut dst)
            .unwrap_err();
        assert!(matches!(err, FrameError::OversizedPayload { size: 3, max: 2 }));
        assert!(dst.is_empty());
        assert_eq!(codec.config().max_payload_size, 2);
    }
}
