//! Canonical MessagePack encoder.
//!
//! Every value is written with the smallest header that can hold it, so equal
//! inputs always produce identical bytes.

use std::io;

use mpack_buffers::Writer;

use crate::constants::*;
use crate::{EncodeError, Value};

/// Byte destination for [`Encoder`].
///
/// Only [`put`](Sink::put) is required; the marker helpers exist so that an
/// in-memory sink can write header and payload in a single bounds check.
pub trait Sink {
    fn put(&mut self, bytes: &[u8]) -> Result<(), EncodeError>;

    fn marker(&mut self, marker: u8) -> Result<(), EncodeError> {
        self.put(&[marker])
    }

    fn marker_u8(&mut self, marker: u8, val: u8) -> Result<(), EncodeError> {
        self.put(&[marker, val])
    }

    fn marker_u16(&mut self, marker: u8, val: u16) -> Result<(), EncodeError> {
        let [a, b] = val.to_be_bytes();
        self.put(&[marker, a, b])
    }

    fn marker_u32(&mut self, marker: u8, val: u32) -> Result<(), EncodeError> {
        let [a, b, c, d] = val.to_be_bytes();
        self.put(&[marker, a, b, c, d])
    }

    fn marker_u64(&mut self, marker: u8, val: u64) -> Result<(), EncodeError> {
        self.marker(marker)?;
        self.put(&val.to_be_bytes())
    }

    fn marker_f32(&mut self, marker: u8, val: f32) -> Result<(), EncodeError> {
        self.marker_u32(marker, val.to_bits())
    }

    fn marker_f64(&mut self, marker: u8, val: f64) -> Result<(), EncodeError> {
        self.marker_u64(marker, val.to_bits())
    }
}

impl Sink for Writer {
    #[inline]
    fn put(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.buf(bytes);
        Ok(())
    }

    #[inline]
    fn marker(&mut self, marker: u8) -> Result<(), EncodeError> {
        self.u8(marker);
        Ok(())
    }

    #[inline]
    fn marker_u8(&mut self, marker: u8, val: u8) -> Result<(), EncodeError> {
        self.u8u8(marker, val);
        Ok(())
    }

    #[inline]
    fn marker_u16(&mut self, marker: u8, val: u16) -> Result<(), EncodeError> {
        self.u8u16(marker, val);
        Ok(())
    }

    #[inline]
    fn marker_u32(&mut self, marker: u8, val: u32) -> Result<(), EncodeError> {
        self.u8u32(marker, val);
        Ok(())
    }

    #[inline]
    fn marker_u64(&mut self, marker: u8, val: u64) -> Result<(), EncodeError> {
        self.u8u64(marker, val);
        Ok(())
    }

    #[inline]
    fn marker_f32(&mut self, marker: u8, val: f32) -> Result<(), EncodeError> {
        self.u8f32(marker, val);
        Ok(())
    }

    #[inline]
    fn marker_f64(&mut self, marker: u8, val: f64) -> Result<(), EncodeError> {
        self.u8f64(marker, val);
        Ok(())
    }
}

/// Write-through sink over any [`io::Write`].
pub struct IoSink<W>(pub W);

impl<W: io::Write> Sink for IoSink<W> {
    fn put(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.0.write_all(bytes)?;
        Ok(())
    }
}

pub struct Encoder<S = Writer> {
    pub sink: S,
}

impl Default for Encoder<Writer> {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Writer> {
    pub fn new() -> Self {
        Self {
            sink: Writer::new(),
        }
    }

    /// Encodes `value` into a fresh byte vector. On error the partial output
    /// is discarded.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.sink.reset();
        match self.write_any(value) {
            Ok(()) => Ok(self.sink.flush()),
            Err(err) => {
                self.sink.reset();
                Err(err)
            }
        }
    }
}

impl<W: io::Write> Encoder<IoSink<W>> {
    pub fn from_writer(out: W) -> Self {
        Self { sink: IoSink(out) }
    }

    pub fn into_writer(self) -> W {
        self.sink.0
    }
}

impl<S: Sink> Encoder<S> {
    pub fn with_sink(sink: S) -> Self {
        Self { sink }
    }

    pub fn write_any(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Nil => self.sink.marker(NIL),
            Value::Bool(b) => self.sink.marker(if *b { TRUE } else { FALSE }),
            Value::Float32(f) => self.sink.marker_f32(FLOAT32, *f),
            Value::Float64(f) => self.sink.marker_f64(FLOAT64, *f),
            Value::Int8(i) => self.write_signed(*i as i64),
            Value::Int16(i) => self.write_signed(*i as i64),
            Value::Int32(i) => self.write_signed(*i as i64),
            Value::Int64(i) => self.write_signed(*i),
            Value::UInt8(u) => self.write_unsigned(*u as u64),
            Value::UInt16(u) => self.write_unsigned(*u as u64),
            Value::UInt32(u) => self.write_unsigned(*u as u64),
            Value::UInt64(u) => self.write_unsigned(*u),
            Value::String(s) => {
                self.write_str_hdr(s.len())?;
                self.sink.put(s)
            }
            Value::Binary(b) => {
                self.write_bin_hdr(b.len())?;
                self.sink.put(b)
            }
            Value::Array(items) => {
                self.write_arr_hdr(items.len())?;
                for item in items.iter() {
                    self.write_any(item)?;
                }
                Ok(())
            }
            Value::Object(map) => {
                self.write_obj_hdr(map.len())?;
                for (key, val) in map.iter() {
                    self.write_any(key)?;
                    self.write_any(val)?;
                }
                Ok(())
            }
            Value::Extension(kind, data) => {
                self.write_ext_hdr(*kind, data.len())?;
                self.sink.put(data)
            }
        }
    }

    pub fn write_unsigned(&mut self, uint: u64) -> Result<(), EncodeError> {
        if uint < 0x80 {
            self.sink.marker(uint as u8)
        } else if uint <= 0xff {
            self.sink.marker_u8(UINT8, uint as u8)
        } else if uint <= 0xffff {
            self.sink.marker_u16(UINT16, uint as u16)
        } else if uint <= 0xffff_ffff {
            self.sink.marker_u32(UINT32, uint as u32)
        } else {
            self.sink.marker_u64(UINT64, uint)
        }
    }

    pub fn write_signed(&mut self, int: i64) -> Result<(), EncodeError> {
        if int >= 0 {
            self.write_unsigned(int as u64)
        } else if int >= -0x20 {
            // negative fixint: 0xe0..0xff
            self.sink.marker(int as u8)
        } else if int >= -0x80 {
            self.sink.marker_u8(INT8, int as u8)
        } else if int >= -0x8000 {
            self.sink.marker_u16(INT16, int as u16)
        } else if int >= -0x8000_0000 {
            self.sink.marker_u32(INT32, int as u32)
        } else {
            self.sink.marker_u64(INT64, int as u64)
        }
    }

    pub fn write_str_hdr(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= FIXSTR_MAX {
            self.sink.marker(FIXSTR | len as u8)
        } else {
            self.write_len8(STR8, STR16, STR32, len)
        }
    }

    pub fn write_bin_hdr(&mut self, len: usize) -> Result<(), EncodeError> {
        self.write_len8(BIN8, BIN16, BIN32, len)
    }

    pub fn write_arr_hdr(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= FIXARRAY_MAX {
            self.sink.marker(FIXARRAY | len as u8)
        } else {
            self.write_len16(ARRAY16, ARRAY32, len)
        }
    }

    pub fn write_obj_hdr(&mut self, len: usize) -> Result<(), EncodeError> {
        if len <= FIXMAP_MAX {
            self.sink.marker(FIXMAP | len as u8)
        } else {
            self.write_len16(MAP16, MAP32, len)
        }
    }

    /// Extension header including the type byte.
    pub fn write_ext_hdr(&mut self, kind: i8, len: usize) -> Result<(), EncodeError> {
        let kind = kind as u8;
        match len {
            1 => self.sink.marker_u8(FIXEXT1, kind),
            2 => self.sink.marker_u8(FIXEXT2, kind),
            4 => self.sink.marker_u8(FIXEXT4, kind),
            8 => self.sink.marker_u8(FIXEXT8, kind),
            16 => self.sink.marker_u8(FIXEXT16, kind),
            _ => {
                self.write_len8(EXT8, EXT16, EXT32, len)?;
                self.sink.marker(kind)
            }
        }
    }

    fn write_len8(&mut self, m8: u8, m16: u8, m32: u8, len: usize) -> Result<(), EncodeError> {
        if len <= 0xff {
            self.sink.marker_u8(m8, len as u8)
        } else {
            self.write_len16(m16, m32, len)
        }
    }

    fn write_len16(&mut self, m16: u8, m32: u8, len: usize) -> Result<(), EncodeError> {
        if len <= 0xffff {
            self.sink.marker_u16(m16, len as u16)
        } else {
            let len32 = u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { len })?;
            self.sink.marker_u32(m32, len32)
        }
    }
}
