//! Buffer error type.

use thiserror::Error;

/// Error returned by the bounds-checked readers.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read of `wanted` bytes started at `offset` but only `available`
    /// bytes were left.
    #[error("end of buffer: wanted {wanted} byte(s) at offset {offset}, {available} available")]
    EndOfBuffer {
        offset: usize,
        wanted: usize,
        available: usize,
    },
}

impl BufferError {
    /// Offset at which the failing read started.
    pub fn offset(&self) -> usize {
        match self {
            BufferError::EndOfBuffer { offset, .. } => *offset,
        }
    }
}
