// SPDX-License-Identifier: MIT

use super::*;
use crate::envelope::Envelope;
use bytes::BytesMut;
use cronmesh_core::{Event, EventTarget};

fn sample_envelope() -> Envelope {
    Envelope::new(Event::ReloadConfig { target: EventTarget::project(1) })
        .with_header(HEADER_AGENT_IP, "10.0.0.1")
}

#[test]
fn encodes_one_newline_terminated_json_line() {
    let mut buf = BytesMut::new();
    let mut codec = EnvelopeCodec;
    codec.encode(sample_envelope(), &mut buf).expect("encodes");
    assert_eq!(buf[buf.len() - 1], b'\n');
    assert_eq!(buf.iter().filter(|&&b| b == b'\n').count(), 1);
}

#[test]
fn round_trips_through_encode_decode() {
    let mut buf = BytesMut::new();
    let mut codec = EnvelopeCodec;
    let original = sample_envelope();
    codec.encode(original.clone(), &mut buf).expect("encodes");
    let decoded = codec.decode(&mut buf).expect("decodes").expect("has a frame");
    assert_eq!(decoded, original);
    assert!(buf.is_empty());
}

#[test]
fn decode_waits_for_a_full_line() {
    let mut buf = BytesMut::new();
    let mut codec = EnvelopeCodec;
    let mut full = BytesMut::new();
    codec.encode(sample_envelope(), &mut full).expect("encodes");
    // Feed all but the trailing newline; decoder must not produce a frame yet.
    buf.extend_from_slice(&full[..full.len() - 1]);
    assert!(codec.decode(&mut buf).expect("no error").is_none());
}

#[test]
fn decodes_two_frames_pushed_back_to_back() {
    let mut buf = BytesMut::new();
    let mut codec = EnvelopeCodec;
    let a = sample_envelope();
    let b = sample_envelope();
    codec.encode(a.clone(), &mut buf).expect("encodes");
    codec.encode(b.clone(), &mut buf).expect("encodes");
    let first = codec.decode(&mut buf).expect("decodes").expect("has a frame");
    let second = codec.decode(&mut buf).expect("decodes").expect("has a frame");
    assert_eq!(first, a);
    assert_eq!(second, b);
    assert!(buf.is_empty());
}

#[test]
fn malformed_json_line_is_a_codec_error() {
    let mut buf = BytesMut::new();
    buf.extend_from_slice(b"not json\n");
    let mut codec = EnvelopeCodec;
    assert!(matches!(codec.decode(&mut buf), Err(CodecError::Json(_))));
}
