//! Streaming octet reader for reading across chunk boundaries.

use std::collections::VecDeque;

use crate::BufferError;

/// A streaming reader that manages multiple chunks of byte slices.
///
/// Chunks are never merged into a single buffer; reads walk across chunk
/// boundaries as needed. Offsets reported in errors are relative to the
/// first unconsumed byte.
pub struct StreamingOctetReader {
    chunks: VecDeque<Vec<u8>>,
    /// Current position within the front chunk.
    x: usize,
    /// Total size of all chunks, including the consumed part of the front one.
    chunk_size: usize,
}

impl Default for StreamingOctetReader {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingOctetReader {
    /// Creates a new streaming reader.
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
            x: 0,
            chunk_size: 0,
        }
    }

    /// Returns the number of bytes remaining to be read.
    pub fn size(&self) -> usize {
        self.chunk_size - self.x
    }

    /// Adds a chunk of data to be read. Empty chunks are ignored.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.chunk_size += chunk.len();
        self.chunks.push_back(chunk);
    }

    fn assert_size(&self, size: usize) -> Result<(), BufferError> {
        if size > self.size() {
            return Err(BufferError::EndOfBuffer {
                offset: 0,
                wanted: size,
                available: self.size(),
            });
        }
        Ok(())
    }

    /// Returns a cursor that reads ahead without consuming anything.
    ///
    /// Once the caller is satisfied with what it read, it passes
    /// [`ChunkCursor::position`] to [`skip`](Self::skip) to commit.
    pub fn cursor(&self) -> ChunkCursor<'_> {
        ChunkCursor {
            chunks: &self.chunks,
            chunk: 0,
            x: self.x,
            pos: 0,
            size: self.size(),
        }
    }

    /// Returns a cursor resuming from `mark`.
    ///
    /// The mark must come from a cursor over this reader with no consuming
    /// call (`u8`, `buf`, `skip`) in between. Pushing more chunks is fine.
    pub fn cursor_at(&self, mark: ChunkMark) -> ChunkCursor<'_> {
        ChunkCursor {
            chunks: &self.chunks,
            chunk: mark.chunk,
            x: mark.x,
            pos: mark.pos,
            size: self.size(),
        }
    }

    /// Peeks at the next byte without advancing.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.assert_size(1)?;
        Ok(self.chunks[0][self.x])
    }

    /// Reads a single unsigned byte.
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let octet = self.peek()?;
        self.skip_unchecked(1);
        Ok(octet)
    }

    /// Reads bytes into a new vector.
    pub fn buf(&mut self, size: usize) -> Result<Vec<u8>, BufferError> {
        let out = self.cursor().buf(size)?;
        self.skip_unchecked(size);
        Ok(out)
    }

    /// Skips bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.assert_size(n)?;
        self.skip_unchecked(n);
        Ok(())
    }

    fn skip_unchecked(&mut self, mut n: usize) {
        while n > 0 {
            let Some(chunk) = self.chunks.front() else {
                return;
            };
            let remaining = chunk.len() - self.x;
            if remaining > n {
                self.x += n;
                return;
            }
            n -= remaining;
            self.chunk_size -= chunk.len();
            self.chunks.pop_front();
            self.x = 0;
        }
    }
}

/// Saved [`ChunkCursor`] position, see [`StreamingOctetReader::cursor_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMark {
    chunk: usize,
    x: usize,
    pos: usize,
}

/// Read-ahead view over a [`StreamingOctetReader`].
///
/// Reading through a cursor never changes the underlying reader.
pub struct ChunkCursor<'a> {
    chunks: &'a VecDeque<Vec<u8>>,
    chunk: usize,
    x: usize,
    pos: usize,
    size: usize,
}

impl ChunkCursor<'_> {
    /// Number of bytes read through this cursor so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn mark(&self) -> ChunkMark {
        ChunkMark {
            chunk: self.chunk,
            x: self.x,
            pos: self.pos,
        }
    }

    /// Number of bytes still readable through this cursor.
    pub fn remaining(&self) -> usize {
        self.size - self.pos
    }

    fn check(&self, n: usize) -> Result<(), BufferError> {
        if n > self.remaining() {
            return Err(BufferError::EndOfBuffer {
                offset: self.pos,
                wanted: n,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Reads a single unsigned byte.
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.check(1)?;
        let chunks = self.chunks;
        let chunk = &chunks[self.chunk];
        let octet = chunk[self.x];
        self.x += 1;
        self.pos += 1;
        if self.x == chunk.len() {
            self.chunk += 1;
            self.x = 0;
        }
        Ok(octet)
    }

    /// Fills `dst` completely, or fails without a partial read.
    pub fn copy_to(&mut self, dst: &mut [u8]) -> Result<(), BufferError> {
        self.check(dst.len())?;
        let chunks = self.chunks;
        let mut filled = 0;
        while filled < dst.len() {
            let chunk = &chunks[self.chunk];
            let available = chunk.len() - self.x;
            let to_copy = available.min(dst.len() - filled);
            dst[filled..filled + to_copy].copy_from_slice(&chunk[self.x..self.x + to_copy]);
            filled += to_copy;
            if to_copy == available {
                self.chunk += 1;
                self.x = 0;
            } else {
                self.x += to_copy;
            }
        }
        self.pos += dst.len();
        Ok(())
    }

    /// Reads `size` bytes into a new vector.
    pub fn buf(&mut self, size: usize) -> Result<Vec<u8>, BufferError> {
        self.check(size)?;
        let mut out = vec![0u8; size];
        self.copy_to(&mut out)?;
        Ok(out)
    }

    /// Advances past `n` bytes without copying them.
    pub fn skip(&mut self, n: usize) -> Result<(), BufferError> {
        self.check(n)?;
        let chunks = self.chunks;
        let mut left = n;
        while left > 0 {
            let available = chunks[self.chunk].len() - self.x;
            if available > left {
                self.x += left;
                break;
            }
            left -= available;
            self.chunk += 1;
            self.x = 0;
        }
        self.pos += n;
        Ok(())
    }
}
