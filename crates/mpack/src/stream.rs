//! Decoding from byte streams.
//!
//! [`decode_from_reader`] pulls one value from a blocking reader.
//! [`StreamDecoder`] is the push-driven counterpart: feed it chunks as they
//! arrive and ask for complete values.

use std::io::Read;

use mpack_buffers::{ChunkMark, StreamingOctetReader};
use tracing::trace;

use crate::decoder::read_header;
use crate::input::IoInput;
use crate::{DecodeError, DecodeOptions, Decoder, ReadError, Value};

/// Reads exactly one value from `reader`. Bytes after the value are left
/// unread.
pub fn decode_from_reader<R: Read>(reader: R) -> Result<Value, ReadError> {
    decode_from_reader_with(reader, DecodeOptions::default())
}

pub fn decode_from_reader_with<R: Read>(
    reader: R,
    options: DecodeOptions,
) -> Result<Value, ReadError> {
    let mut input = IoInput::new(reader);
    match Decoder::with_options(options).read_any(&mut input) {
        Ok(value) => Ok(value),
        Err(err) => match input.take_error() {
            Some(io) => Err(ReadError::Io(io)),
            None => Err(ReadError::Decode(err)),
        },
    }
}

/// Incremental decoder over pushed chunks.
///
/// A value is only consumed once it is complete. While the buffered bytes
/// hold a prefix of a value, [`next_value`](StreamDecoder::next_value)
/// returns `Ok(None)` and keeps them for the next attempt. Headers are scanned
/// as they arrive, so a value is built once no matter how it was chunked.
///
/// ```
/// use mpack::{StreamDecoder, Value};
///
/// let mut stream = StreamDecoder::new();
/// stream.push(vec![0x92, 0x01]);
/// assert_eq!(stream.next_value(), Ok(None));
/// stream.push(vec![0x02]);
/// assert_eq!(stream.next_value(), Ok(Some(Value::array([1u8, 2]))));
/// ```
pub struct StreamDecoder {
    reader: StreamingOctetReader,
    decoder: Decoder,
    /// Bytes consumed by values already returned.
    consumed: usize,
    scan: Scan,
    #[cfg(test)]
    full_parses: usize,
}

/// How far the pending value has been seen to arrive.
#[derive(Debug, Default)]
struct Scan {
    /// Just past the last header whose payload is fully buffered.
    mark: Option<ChunkMark>,
    /// Children still expected by each open container, innermost last.
    open: Vec<usize>,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self {
            reader: StreamingOctetReader::new(),
            decoder: Decoder::with_options(options),
            consumed: 0,
            scan: Scan::default(),
            #[cfg(test)]
            full_parses: 0,
        }
    }

    pub fn push(&mut self, chunk: impl Into<Vec<u8>>) {
        self.reader.push(chunk.into());
    }

    /// Bytes received but not yet returned as part of a value.
    pub fn buffered(&self) -> usize {
        self.reader.size()
    }

    /// Total bytes consumed by returned values.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Returns the next complete value, `Ok(None)` if more bytes are needed.
    ///
    /// Errors carry offsets relative to the start of the stream. After an
    /// error the offending bytes stay buffered; call [`clear`](Self::clear)
    /// to drop them.
    pub fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        if self.reader.size() == 0 {
            return Ok(None);
        }
        if !self.advance_scan() {
            trace!(buffered = self.reader.size(), "waiting for more bytes");
            return Ok(None);
        }
        self.scan = Scan::default();
        #[cfg(test)]
        {
            self.full_parses += 1;
        }
        let mut cursor = self.reader.cursor();
        match self.decoder.read_any(&mut cursor) {
            Ok(value) => {
                let used = cursor.position();
                self.reader.skip(used)?;
                self.consumed += used;
                Ok(Some(value))
            }
            Err(DecodeError::EndOfBuffer { offset }) => {
                trace!(buffered = self.reader.size(), offset, "waiting for more bytes");
                Ok(None)
            }
            Err(err) => Err(err.rebase(self.consumed)),
        }
    }

    /// Walks headers that arrived since the last call. Returns `true` once a
    /// whole value is buffered, or once the decoder has an error to report.
    fn advance_scan(&mut self) -> bool {
        let max_depth = self.decoder.options().max_depth;
        let mut cursor = match self.scan.mark {
            Some(mark) => self.reader.cursor_at(mark),
            None => self.reader.cursor(),
        };
        loop {
            if self.scan.open.len() > max_depth {
                return true;
            }
            let (payload, children) = match read_header(&mut cursor) {
                Ok(header) => header,
                Err(DecodeError::EndOfBuffer { .. }) => return false,
                Err(_) => return true,
            };
            if cursor.skip(payload).is_err() {
                return false;
            }
            self.scan.mark = Some(cursor.mark());
            if children > 0 {
                self.scan.open.push(children);
                continue;
            }
            loop {
                match self.scan.open.last_mut() {
                    None => return true,
                    Some(left) => {
                        *left -= 1;
                        if *left > 0 {
                            break;
                        }
                        self.scan.open.pop();
                    }
                }
            }
        }
    }

    /// Drops everything buffered.
    pub fn clear(&mut self) {
        self.consumed += self.reader.size();
        self.reader = StreamingOctetReader::new();
        self.scan = Scan::default();
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{encode, DecodeErrorKind};

    fn sample() -> Value {
        Value::object([
            ("id", Value::from(70_000u32)),
            ("name", Value::from("stream")),
            ("blob", Value::binary([0u8; 40])),
            ("list", Value::array([-1i16, 2, -300])),
        ])
    }

    #[test]
    fn byte_at_a_time() {
        let bytes = encode(&sample()).unwrap();
        let mut stream = StreamDecoder::new();
        let mut produced = Vec::new();
        for &b in &bytes {
            stream.push(vec![b]);
            if let Some(v) = stream.next_value().unwrap() {
                produced.push(v);
            }
        }
        assert_eq!(produced, [sample()]);
        assert_eq!(stream.full_parses, 1);
        assert_eq!(stream.buffered(), 0);
        assert_eq!(stream.consumed(), bytes.len());
        assert_eq!(stream.next_value(), Ok(None));
    }

    #[test]
    fn large_array_in_small_chunks_is_built_once() {
        let big = Value::array((0..20_000u32).map(|i| (i % 100) as u8));
        let bytes = encode(&big).unwrap();
        assert_eq!(bytes.len(), 20_003);
        let mut stream = StreamDecoder::new();
        let mut produced = Vec::new();
        for chunk in bytes.chunks(16) {
            stream.push(chunk);
            if let Some(v) = stream.next_value().unwrap() {
                produced.push(v);
            }
        }
        assert_eq!(produced, [big]);
        assert_eq!(stream.full_parses, 1);
        assert_eq!(stream.consumed(), bytes.len());
    }

    #[test]
    fn scan_resumes_inside_headers_and_payloads() {
        let bytes = [0x92, 0xcd, 0x01, 0x00, 0xc7, 0x02, 0x05, 0xaa, 0xbb];
        let mut stream = StreamDecoder::new();
        stream.push(&bytes[..2]);
        assert_eq!(stream.next_value(), Ok(None));
        stream.push(&bytes[2..5]);
        assert_eq!(stream.next_value(), Ok(None));
        stream.push(&bytes[5..8]);
        assert_eq!(stream.next_value(), Ok(None));
        stream.push(&bytes[8..]);
        assert_eq!(
            stream.next_value(),
            Ok(Some(Value::array([
                Value::from(256u16),
                Value::extension(5, [0xaau8, 0xbb])
            ])))
        );
        assert_eq!(stream.full_parses, 1);
    }

    #[test]
    fn several_values_in_one_chunk() {
        let mut stream = StreamDecoder::new();
        stream.push(vec![0x01, 0xa1, b'x', 0xc0, 0x92]);
        assert_eq!(stream.next_value(), Ok(Some(Value::from(1u8))));
        assert_eq!(stream.next_value(), Ok(Some(Value::from("x"))));
        assert_eq!(stream.next_value(), Ok(Some(Value::Nil)));
        assert_eq!(stream.next_value(), Ok(None));
        assert_eq!(stream.buffered(), 1);
    }

    #[test]
    fn hard_errors_are_immediate_and_absolute() {
        let mut stream = StreamDecoder::new();
        stream.push(vec![0x01, 0x92, 0x01]);
        assert_eq!(stream.next_value(), Ok(Some(Value::from(1u8))));
        stream.push(vec![0xc1]);
        assert_eq!(
            stream.next_value(),
            Err(DecodeError::InvalidByte {
                byte: 0xc1,
                offset: 3
            })
        );
        stream.clear();
        stream.push(vec![0xc3]);
        assert_eq!(stream.next_value(), Ok(Some(Value::from(true))));
    }

    #[test]
    fn depth_error_in_stream() {
        let mut stream = StreamDecoder::with_options(DecodeOptions::default().with_max_depth(1));
        stream.push(vec![0x91]);
        assert_eq!(stream.next_value(), Ok(None));
        stream.push(vec![0x91]);
        assert_eq!(
            stream.next_value().unwrap_err().kind(),
            DecodeErrorKind::DepthExceeded
        );
    }

    #[test]
    fn reader_leaves_trailing_bytes() {
        let mut bytes = encode(&sample()).unwrap();
        bytes.push(0x07);
        let mut cursor = io::Cursor::new(bytes);
        assert_eq!(decode_from_reader(&mut cursor).unwrap(), sample());
        assert_eq!(decode_from_reader(&mut cursor).unwrap(), Value::from(7u8));
        assert!(matches!(
            decode_from_reader(&mut cursor),
            Err(ReadError::Decode(DecodeError::EndOfBuffer { .. }))
        ));
    }

    #[test]
    fn reader_truncated_mid_value() {
        let bytes = encode(&sample()).unwrap();
        let err = decode_from_reader(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ReadError::Decode(e) if e.kind() == DecodeErrorKind::EndOfBuffer));
    }

    #[test]
    fn reader_surfaces_io_errors() {
        struct Flaky(usize);
        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 == 0 {
                    return Err(io::Error::other("gone"));
                }
                self.0 -= 1;
                buf[0] = 0x91;
                Ok(1)
            }
        }
        let err = decode_from_reader(Flaky(3)).unwrap_err();
        assert!(matches!(err, ReadError::Io(e) if e.kind() == io::ErrorKind::Other));
    }
}
