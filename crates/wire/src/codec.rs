// SPDX-License-Identifier: MIT

//! Newline-delimited JSON framing for [`Envelope`]s over a `tokio-tungstenite`
//! text-message stream.

use crate::envelope::Envelope;
use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeCodec;

impl Decoder for EnvelopeCodec {
    type Item = Envelope;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Envelope>, CodecError> {
        let Some(newline_at) = src.iter().position(|&b| b == b'\n') else { return Ok(None) };
        let line = src.split_to(newline_at);
        src.advance(1); // consume the newline itself
        if line.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&line)?))
    }
}

impl Encoder<Envelope> for EnvelopeCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Envelope, dst: &mut BytesMut) -> Result<(), CodecError> {
        let mut line = serde_json::to_vec(&item)?;
        line.push(b'\n');
        dst.extend_from_slice(&line);
        Ok(())
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
