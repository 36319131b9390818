//! Byte sources the decoder can pull from.

use std::io::{self, Read};
use std::sync::Arc;

use mpack_buffers::{BufferError, ChunkCursor, Reader};

/// Sequential, bounds-checked byte source.
///
/// A failed read reports [`BufferError::EndOfBuffer`] with the offset at
/// which the read started.
pub trait Input {
    /// Offset of the next byte.
    fn offset(&self) -> usize;

    /// Upper bound on the bytes left, when the source knows it.
    fn remaining_hint(&self) -> Option<usize>;

    fn read_u8(&mut self) -> Result<u8, BufferError>;

    /// Fills `dst` completely.
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError>;

    /// Reads an `n`-byte payload.
    fn read_payload(&mut self, n: usize) -> Result<Arc<[u8]>, BufferError>;

    fn skip_bytes(&mut self, n: usize) -> Result<(), BufferError>;
}

impl Input for Reader<'_> {
    #[inline]
    fn offset(&self) -> usize {
        self.x
    }

    #[inline]
    fn remaining_hint(&self) -> Option<usize> {
        Some(self.size())
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, BufferError> {
        self.u8()
    }

    #[inline]
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        dst.copy_from_slice(self.buf(dst.len())?);
        Ok(())
    }

    fn read_payload(&mut self, n: usize) -> Result<Arc<[u8]>, BufferError> {
        self.buf(n).map(Arc::from)
    }

    fn skip_bytes(&mut self, n: usize) -> Result<(), BufferError> {
        self.skip(n)
    }
}

impl Input for ChunkCursor<'_> {
    fn offset(&self) -> usize {
        self.position()
    }

    fn remaining_hint(&self) -> Option<usize> {
        Some(self.remaining())
    }

    fn read_u8(&mut self) -> Result<u8, BufferError> {
        self.u8()
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        self.copy_to(dst)
    }

    fn read_payload(&mut self, n: usize) -> Result<Arc<[u8]>, BufferError> {
        self.buf(n).map(Arc::from)
    }

    fn skip_bytes(&mut self, n: usize) -> Result<(), BufferError> {
        self.skip(n)
    }
}

/// Adapts a blocking [`Read`] into an [`Input`].
///
/// End of stream surfaces as [`BufferError::EndOfBuffer`]. Any other I/O
/// failure also ends decoding that way, and the underlying error is kept for
/// [`take_error`](IoInput::take_error).
pub struct IoInput<R> {
    inner: R,
    pos: usize,
    error: Option<io::Error>,
}

impl<R: Read> IoInput<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pos: 0,
            error: None,
        }
    }

    /// The I/O error that interrupted the last read, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fail(&mut self, err: io::Error, wanted: usize, available: usize) -> BufferError {
        if err.kind() != io::ErrorKind::UnexpectedEof {
            self.error = Some(err);
        }
        BufferError::EndOfBuffer {
            offset: self.pos,
            wanted,
            available,
        }
    }
}

impl<R: Read> Input for IoInput<R> {
    fn offset(&self) -> usize {
        self.pos
    }

    fn remaining_hint(&self) -> Option<usize> {
        None
    }

    fn read_u8(&mut self) -> Result<u8, BufferError> {
        let mut byte = [0u8; 1];
        self.read_into(&mut byte)?;
        Ok(byte[0])
    }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        match self.inner.read_exact(dst) {
            Ok(()) => {
                self.pos += dst.len();
                Ok(())
            }
            Err(err) => Err(self.fail(err, dst.len(), 0)),
        }
    }

    /// Grows the payload as bytes arrive instead of trusting `n` up front.
    fn read_payload(&mut self, n: usize) -> Result<Arc<[u8]>, BufferError> {
        let mut out = Vec::new();
        let read = (&mut self.inner).take(n as u64).read_to_end(&mut out);
        match read {
            Ok(got) if got == n => {
                self.pos += n;
                Ok(Arc::from(out))
            }
            Ok(got) => Err(self.fail(io::ErrorKind::UnexpectedEof.into(), n, got)),
            Err(err) => Err(self.fail(err, n, out.len())),
        }
    }

    fn skip_bytes(&mut self, n: usize) -> Result<(), BufferError> {
        let copied = io::copy(&mut (&mut self.inner).take(n as u64), &mut io::sink());
        match copied {
            Ok(got) if got == n as u64 => {
                self.pos += n;
                Ok(())
            }
            Ok(got) => Err(self.fail(
                io::ErrorKind::UnexpectedEof.into(),
                n,
                got as usize,
            )),
            Err(err) => Err(self.fail(err, n, 0)),
        }
    }
}
