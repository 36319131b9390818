//! One-shot helpers over [`Encoder`] and [`Decoder`].

use std::io::Write;

use mpack_buffers::Writer;

use crate::{DecodeError, Decoder, EncodeError, Encoder, MultiDecode, Value};

/// Starting buffer for [`encode`]; the writer doubles past it on demand.
const ONE_SHOT_ALLOC: usize = 256;

fn one_shot_encoder() -> Encoder {
    Encoder::with_sink(Writer::with_alloc_size(ONE_SHOT_ALLOC))
}

/// Encodes `value` canonically.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    one_shot_encoder().encode(value)
}

/// Encodes `value` straight into `out`.
pub fn encode_to<W: Write>(value: &Value, out: W) -> Result<(), EncodeError> {
    Encoder::from_writer(out).write_any(value)
}

/// Decodes the first value in `bytes` with default options.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    Decoder::new().decode(bytes)
}

pub fn decode_partial(bytes: &[u8]) -> Result<(Value, usize), DecodeError> {
    Decoder::new().decode_partial(bytes)
}

pub fn decode_multi(bytes: &[u8]) -> MultiDecode {
    Decoder::new().decode_multi(bytes)
}

/// Checks that `bytes` starts with one well-formed value and returns its
/// encoded length.
pub fn validate(bytes: &[u8]) -> Result<usize, DecodeError> {
    Decoder::new().validate(bytes)
}
