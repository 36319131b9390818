use std::io;

use mpack_buffers::BufferError;
use thiserror::Error;

use crate::Type;

/// What went wrong while decoding, without the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeErrorKind {
    EndOfBuffer,
    InvalidByte,
    DepthExceeded,
}

/// Decoding failure. Offsets are byte positions relative to where decoding
/// started.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input at offset {offset}")]
    EndOfBuffer { offset: usize },
    #[error("invalid byte 0x{byte:02x} at offset {offset}")]
    InvalidByte { byte: u8, offset: usize },
    #[error("maximum nesting depth exceeded at offset {offset}")]
    DepthExceeded { offset: usize },
}

impl DecodeError {
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::EndOfBuffer { offset }
            | DecodeError::InvalidByte { offset, .. }
            | DecodeError::DepthExceeded { offset } => offset,
        }
    }

    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::EndOfBuffer { .. } => DecodeErrorKind::EndOfBuffer,
            DecodeError::InvalidByte { .. } => DecodeErrorKind::InvalidByte,
            DecodeError::DepthExceeded { .. } => DecodeErrorKind::DepthExceeded,
        }
    }

    /// Shifts the offset by `base` bytes.
    pub(crate) fn rebase(self, base: usize) -> Self {
        match self {
            DecodeError::EndOfBuffer { offset } => DecodeError::EndOfBuffer {
                offset: offset + base,
            },
            DecodeError::InvalidByte { byte, offset } => DecodeError::InvalidByte {
                byte,
                offset: offset + base,
            },
            DecodeError::DepthExceeded { offset } => DecodeError::DepthExceeded {
                offset: offset + base,
            },
        }
    }
}

impl From<BufferError> for DecodeError {
    fn from(err: BufferError) -> Self {
        DecodeError::EndOfBuffer {
            offset: err.offset(),
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("length {len} does not fit in a 32-bit MessagePack length field")]
    LengthOverflow { len: usize },
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Failure while decoding from an [`io::Read`] source.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected MessagePack object")]
    NotAnObject,
    #[error("bad type for field `{field}`: expected {expected}, found {found}")]
    BadType {
        field: String,
        expected: Type,
        found: Type,
    },
}

/// A [`Value`](crate::Value) with no faithful JSON rendering.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("two object keys render as the JSON key {key:?}")]
    DuplicateKey { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_error_maps_to_end_of_buffer_at_read_start() {
        let err: DecodeError = BufferError::EndOfBuffer {
            offset: 7,
            wanted: 4,
            available: 1,
        }
        .into();
        assert_eq!(err, DecodeError::EndOfBuffer { offset: 7 });
        assert_eq!(err.kind(), DecodeErrorKind::EndOfBuffer);
    }

    #[test]
    fn rebase_keeps_kind() {
        let err = DecodeError::InvalidByte {
            byte: 0xc1,
            offset: 2,
        }
        .rebase(10);
        assert_eq!(err.offset(), 12);
        assert_eq!(err.kind(), DecodeErrorKind::InvalidByte);
        assert_eq!(err.to_string(), "invalid byte 0xc1 at offset 12");
    }
}
