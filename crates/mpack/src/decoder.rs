//! Recursive-descent MessagePack decoder.
//!
//! Decoding dispatches on the leading tag byte. Every read is bounds-checked
//! against the [`Input`], so malformed or truncated data produces a
//! [`DecodeError`] and never a panic.

use std::collections::BTreeMap;
use std::sync::Arc;

use mpack_buffers::Reader;
use tracing::debug;

use crate::constants::*;
use crate::input::Input;
use crate::value::insert_last_wins;
use crate::{DecodeError, Value};

/// Default bound on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Upper bound on speculative preallocation when the input length is unknown.
const PREALLOC_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Deepest nesting level accepted. The top-level value is level 0.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Outcome of [`Decoder::decode_multi`].
#[derive(Debug, Clone, PartialEq)]
pub struct MultiDecode {
    /// Values decoded before input ran out or an error occurred.
    pub values: Vec<Value>,
    /// Offset just past the last decoded value.
    pub stop: usize,
    /// The failure that ended decoding early, if any.
    pub error: Option<DecodeError>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    /// Decodes the first value in `input`. Trailing bytes are ignored.
    pub fn decode(&self, input: &[u8]) -> Result<Value, DecodeError> {
        self.decode_partial(input).map(|(value, _)| value)
    }

    /// Decodes the first value in `input` and reports how many bytes it used.
    pub fn decode_partial(&self, input: &[u8]) -> Result<(Value, usize), DecodeError> {
        let mut reader = Reader::new(input);
        match self.read_any(&mut reader) {
            Ok(value) => Ok((value, reader.x)),
            Err(err) => {
                debug!(kind = ?err.kind(), offset = err.offset(), "msgpack decode failed");
                Err(err)
            }
        }
    }

    /// Decodes back-to-back values until `input` is exhausted or a value
    /// fails to decode.
    pub fn decode_multi(&self, input: &[u8]) -> MultiDecode {
        let mut reader = Reader::new(input);
        let mut values = Vec::new();
        let mut error = None;
        let mut stop = 0;
        while reader.size() > 0 {
            match self.read_any(&mut reader) {
                Ok(value) => {
                    values.push(value);
                    stop = reader.x;
                }
                Err(err) => {
                    error = Some(err);
                    break;
                }
            }
        }
        if let Some(err) = &error {
            debug!(values = values.len(), stop, error = %err, "decode_multi stopped early");
        }
        MultiDecode {
            values,
            stop,
            error,
        }
    }

    /// Reads one value from any [`Input`].
    pub fn read_any<I: Input>(&self, input: &mut I) -> Result<Value, DecodeError> {
        self.read_value(input, 0)
    }

    fn read_value<I: Input>(&self, input: &mut I, depth: usize) -> Result<Value, DecodeError> {
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                offset: input.offset(),
            });
        }
        let offset = input.offset();
        let byte = input.read_u8()?;
        Ok(match byte {
            0x00..=0x7f => Value::UInt8(byte),
            0x80..=0x8f => return self.read_obj(input, (byte & 0x0f) as usize, depth),
            0x90..=0x9f => return self.read_arr(input, (byte & 0x0f) as usize, depth),
            0xa0..=0xbf => Value::String(input.read_payload((byte & 0x1f) as usize)?),
            NIL => Value::Nil,
            NEVER_USED => return Err(DecodeError::InvalidByte { byte, offset }),
            FALSE => Value::Bool(false),
            TRUE => Value::Bool(true),
            BIN8 => {
                let n = read_u8(input)? as usize;
                Value::Binary(input.read_payload(n)?)
            }
            BIN16 => {
                let n = read_u16(input)? as usize;
                Value::Binary(input.read_payload(n)?)
            }
            BIN32 => {
                let n = read_u32(input)? as usize;
                Value::Binary(input.read_payload(n)?)
            }
            EXT8 => {
                let n = read_u8(input)? as usize;
                read_ext(input, n)?
            }
            EXT16 => {
                let n = read_u16(input)? as usize;
                read_ext(input, n)?
            }
            EXT32 => {
                let n = read_u32(input)? as usize;
                read_ext(input, n)?
            }
            FLOAT32 => Value::Float32(f32::from_bits(read_u32(input)?)),
            FLOAT64 => Value::Float64(f64::from_bits(read_u64(input)?)),
            UINT8 => Value::UInt8(read_u8(input)?),
            UINT16 => Value::UInt16(read_u16(input)?),
            UINT32 => Value::UInt32(read_u32(input)?),
            UINT64 => Value::UInt64(read_u64(input)?),
            INT8 => Value::Int8(read_u8(input)? as i8),
            INT16 => Value::Int16(read_u16(input)? as i16),
            INT32 => Value::Int32(read_u32(input)? as i32),
            INT64 => Value::Int64(read_u64(input)? as i64),
            FIXEXT1 => read_ext(input, 1)?,
            FIXEXT2 => read_ext(input, 2)?,
            FIXEXT4 => read_ext(input, 4)?,
            FIXEXT8 => read_ext(input, 8)?,
            FIXEXT16 => read_ext(input, 16)?,
            STR8 => {
                let n = read_u8(input)? as usize;
                Value::String(input.read_payload(n)?)
            }
            STR16 => {
                let n = read_u16(input)? as usize;
                Value::String(input.read_payload(n)?)
            }
            STR32 => {
                let n = read_u32(input)? as usize;
                Value::String(input.read_payload(n)?)
            }
            ARRAY16 => {
                let n = read_u16(input)? as usize;
                return self.read_arr(input, n, depth);
            }
            ARRAY32 => {
                let n = read_u32(input)? as usize;
                return self.read_arr(input, n, depth);
            }
            MAP16 => {
                let n = read_u16(input)? as usize;
                return self.read_obj(input, n, depth);
            }
            MAP32 => {
                let n = read_u32(input)? as usize;
                return self.read_obj(input, n, depth);
            }
            0xe0..=0xff => Value::Int8(byte as i8),
        })
    }

    fn read_arr<I: Input>(
        &self,
        input: &mut I,
        len: usize,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        // Every element takes at least one byte.
        let cap = input.remaining_hint().unwrap_or(PREALLOC_LIMIT).min(len);
        let mut items = Vec::with_capacity(cap);
        for _ in 0..len {
            items.push(self.read_value(input, depth + 1)?);
        }
        Ok(Value::Array(Arc::from(items)))
    }

    fn read_obj<I: Input>(
        &self,
        input: &mut I,
        len: usize,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = self.read_value(input, depth + 1)?;
            let val = self.read_value(input, depth + 1)?;
            insert_last_wins(&mut map, key, val);
        }
        Ok(Value::Object(Arc::new(map)))
    }

    /// Walks one value without building it and returns the bytes it spans.
    pub fn validate(&self, input: &[u8]) -> Result<usize, DecodeError> {
        let mut reader = Reader::new(input);
        self.skip_any(&mut reader)?;
        Ok(reader.x)
    }

    /// Advances `input` past one value, with the same checks as decoding.
    pub fn skip_any<I: Input>(&self, input: &mut I) -> Result<(), DecodeError> {
        self.skip_value(input, 0)
    }

    fn skip_value<I: Input>(&self, input: &mut I, depth: usize) -> Result<(), DecodeError> {
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                offset: input.offset(),
            });
        }
        let (payload, children) = read_header(input)?;
        input.skip_bytes(payload)?;
        for _ in 0..children {
            self.skip_value(input, depth + 1)?;
        }
        Ok(())
    }
}

#[inline]
fn read_u8<I: Input>(input: &mut I) -> Result<u8, DecodeError> {
    Ok(input.read_u8()?)
}

#[inline]
fn read_u16<I: Input>(input: &mut I) -> Result<u16, DecodeError> {
    let mut buf = [0u8; 2];
    input.read_into(&mut buf)?;
    Ok(u16::from_be_bytes(buf))
}

#[inline]
fn read_u32<I: Input>(input: &mut I) -> Result<u32, DecodeError> {
    let mut buf = [0u8; 4];
    input.read_into(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

#[inline]
fn read_u64<I: Input>(input: &mut I) -> Result<u64, DecodeError> {
    let mut buf = [0u8; 8];
    input.read_into(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

fn read_ext<I: Input>(input: &mut I, len: usize) -> Result<Value, DecodeError> {
    let kind = read_u8(input)? as i8;
    Ok(Value::Extension(kind, input.read_payload(len)?))
}

/// Reads one tag with its length fields and returns the payload size in
/// bytes and the number of child values that follow it.
pub(crate) fn read_header<I: Input>(input: &mut I) -> Result<(usize, usize), DecodeError> {
    let offset = input.offset();
    let byte = input.read_u8()?;
    let header = match byte {
        0x00..=0x7f | 0xe0..=0xff | NIL | FALSE | TRUE => (0, 0),
        0x80..=0x8f => (0, 2 * (byte & 0x0f) as usize),
        0x90..=0x9f => (0, (byte & 0x0f) as usize),
        0xa0..=0xbf => ((byte & 0x1f) as usize, 0),
        NEVER_USED => return Err(DecodeError::InvalidByte { byte, offset }),
        BIN8 | STR8 => (read_u8(input)? as usize, 0),
        BIN16 | STR16 => (read_u16(input)? as usize, 0),
        BIN32 | STR32 => (read_u32(input)? as usize, 0),
        EXT8 => {
            let len = read_u8(input)? as usize;
            (skip_ext_kind(input, len)?, 0)
        }
        EXT16 => {
            let len = read_u16(input)? as usize;
            (skip_ext_kind(input, len)?, 0)
        }
        EXT32 => {
            let len = read_u32(input)? as usize;
            (skip_ext_kind(input, len)?, 0)
        }
        UINT8 | INT8 => (1, 0),
        UINT16 | INT16 => (2, 0),
        FLOAT32 | UINT32 | INT32 => (4, 0),
        FLOAT64 | UINT64 | INT64 => (8, 0),
        FIXEXT1 => (skip_ext_kind(input, 1)?, 0),
        FIXEXT2 => (skip_ext_kind(input, 2)?, 0),
        FIXEXT4 => (skip_ext_kind(input, 4)?, 0),
        FIXEXT8 => (skip_ext_kind(input, 8)?, 0),
        FIXEXT16 => (skip_ext_kind(input, 16)?, 0),
        ARRAY16 => (0, read_u16(input)? as usize),
        ARRAY32 => (0, read_u32(input)? as usize),
        MAP16 => (0, 2 * read_u16(input)? as usize),
        MAP32 => (0, (read_u32(input)? as usize).saturating_mul(2)),
    };
    Ok(header)
}

/// Skips the extension type byte and passes the payload length through.
fn skip_ext_kind<I: Input>(input: &mut I, len: usize) -> Result<usize, DecodeError> {
    input.skip_bytes(1)?;
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeErrorKind;

    fn dec(bytes: &[u8]) -> Result<Value, DecodeError> {
        Decoder::new().decode(bytes)
    }

    fn nested_arrays(levels: usize) -> Vec<u8> {
        let mut out = vec![0x91; levels - 1];
        out.push(0x90);
        out
    }

    #[test]
    fn integer_tags() {
        assert_eq!(dec(&[0x05]).unwrap().value_type(), crate::Type::UInt8);
        assert_eq!(dec(&[0xff]).unwrap(), Value::Int8(-1));
        assert_eq!(dec(&[0xe0]).unwrap(), Value::from(-32i8));
        assert!(dec(&[0xcd, 0x01, 0x00]).unwrap().is_uint16());
        assert!(dec(&[0xd2, 0xff, 0xff, 0xff, 0xff]).unwrap().is_int32());
        assert_eq!(
            dec(&[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]).unwrap(),
            Value::from(i64::MIN)
        );
        assert_eq!(
            dec(&[0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap(),
            Value::from(u64::MAX)
        );
    }

    #[test]
    fn accepts_non_minimal_encodings() {
        let v = dec(&[0xd9, 0x01, b'a']).unwrap();
        assert_eq!(v.string_value(), "a");
        let v = dec(&[0xdc, 0x00, 0x01, 0xc0]).unwrap();
        assert_eq!(v.array_items(), &[Value::Nil]);
        assert_eq!(dec(&[0xcd, 0x00, 0x01]).unwrap(), Value::from(1u8));
    }

    #[test]
    fn extensions() {
        assert_eq!(dec(&[0xd4, 0x05, 0x01]).unwrap(), Value::extension(5, [1u8]));
        assert_eq!(
            dec(&[0xc7, 0x00, 0xfe]).unwrap().extension_items(),
            (-2, &[][..])
        );
    }

    #[test]
    fn invalid_byte() {
        assert_eq!(
            dec(&[0x92, 0x01, 0xc1]),
            Err(DecodeError::InvalidByte {
                byte: 0xc1,
                offset: 2
            })
        );
    }

    #[test]
    fn truncation_reports_read_start() {
        assert_eq!(dec(&[]), Err(DecodeError::EndOfBuffer { offset: 0 }));
        assert_eq!(dec(&[0xcd, 0x01]), Err(DecodeError::EndOfBuffer { offset: 1 }));
        assert_eq!(
            dec(&[0xa3, b'a', b'b']),
            Err(DecodeError::EndOfBuffer { offset: 1 })
        );
        assert_eq!(
            dec(&[0x92, 0xc0]),
            Err(DecodeError::EndOfBuffer { offset: 2 })
        );
    }

    #[test]
    fn hostile_length_does_not_preallocate() {
        let err = dec(&[0xdd, 0xff, 0xff, 0xff, 0xff, 0xc0]).unwrap_err();
        assert_eq!(err, DecodeError::EndOfBuffer { offset: 6 });
        let err = dec(&[0xdb, 0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::EndOfBuffer);
    }

    #[test]
    fn depth_limit() {
        assert!(dec(&nested_arrays(201)).is_ok());
        assert_eq!(
            dec(&nested_arrays(202)),
            Err(DecodeError::DepthExceeded { offset: 201 })
        );
        let shallow = Decoder::with_options(DecodeOptions::default().with_max_depth(1));
        assert!(shallow.decode(&[0x91, 0x90]).is_ok());
        assert_eq!(
            shallow.decode(&[0x91, 0x91, 0x90]).unwrap_err().kind(),
            DecodeErrorKind::DepthExceeded
        );
    }

    #[test]
    fn duplicate_keys_last_wins() {
        let v = dec(&[0x82, 0xa1, b'k', 0x01, 0xa1, b'k', 0x02]).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v["k"].uint8_value(), 2);
    }

    #[test]
    fn partial_and_trailing() {
        let d = Decoder::new();
        assert_eq!(d.decode_partial(&[0xc3, 0xc0]), Ok((Value::from(true), 1)));
        assert_eq!(d.decode(&[0x01, 0xc1]), Ok(Value::from(1u8)));
    }

    #[test]
    fn multi_stops_at_first_error() {
        let out = Decoder::new().decode_multi(&[0x01, 0xa1, b'x', 0xc1, 0x02]);
        assert_eq!(out.values, [Value::from(1u8), Value::from("x")]);
        assert_eq!(out.stop, 3);
        assert_eq!(
            out.error,
            Some(DecodeError::InvalidByte {
                byte: 0xc1,
                offset: 3
            })
        );
        let empty = Decoder::new().decode_multi(&[]);
        assert!(empty.values.is_empty() && empty.error.is_none());
    }

    #[test]
    fn validate_skips_sized_extensions() {
        let d = Decoder::new();
        let cases: [(&[u8], usize); 3] = [
            (&[0xc7, 0x02, 0x01, 0xaa, 0xbb, 0xc0], 5),
            (&[0xc8, 0x00, 0x01, 0xfe, 0x07, 0xc0], 5),
            (&[0xc9, 0x00, 0x00, 0x00, 0x00, 0x7f, 0xc0], 6),
        ];
        for (bytes, len) in cases {
            assert_eq!(d.validate(bytes), Ok(len), "{bytes:02x?}");
            assert_eq!(d.decode_partial(bytes).map(|(_, used)| used), Ok(len));
        }
        assert_eq!(
            d.validate(&[0xc8, 0x00, 0x03, 0x01, 0xaa]),
            Err(DecodeError::EndOfBuffer { offset: 4 })
        );
    }

    #[test]
    fn validate_matches_decode() {
        let d = Decoder::new();
        let cases: [&[u8]; 6] = [
            &[0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0xd4, 0x01, 0x02, 0xff],
            &[0xc7, 0x02, 0x01, 0xaa],
            &[0x93, 0xcb, 0, 0, 0, 0, 0, 0, 0],
            &[0xc1],
            &[0x91, 0xc4, 0x03, 0x01],
            &[0xca, 0x3f, 0xc0, 0x00, 0x00, 0x00],
        ];
        for bytes in cases {
            match (d.decode_partial(bytes), d.validate(bytes)) {
                (Ok((_, used)), Ok(len)) => assert_eq!(used, len),
                (Err(a), Err(b)) => assert_eq!(a, b),
                (a, b) => panic!("decode {a:?} but validate {b:?} for {bytes:02x?}"),
            }
        }
        assert_eq!(
            d.validate(&nested_arrays(202)).unwrap_err().kind(),
            DecodeErrorKind::DepthExceeded
        );
    }
}
