//! Byte buffer primitives shared by the `mpack` encoder and decoders.
//!
//! - [`Writer`]: auto-growing output buffer with big-endian integer writes.
//! - [`Reader`]: cursor over a borrowed slice; every read is bounds-checked.
//! - [`StreamingOctetReader`]: queue of pushed chunks that can be read across
//!   chunk boundaries, with a non-consuming [`ChunkCursor`] for speculative
//!   parsing and a [`ChunkMark`] to resume it after more chunks arrive.

mod error;
mod reader;
mod streaming_octet_reader;
mod writer;

pub use error::BufferError;
pub use reader::Reader;
pub use streaming_octet_reader::{ChunkCursor, ChunkMark, StreamingOctetReader};
pub use writer::Writer;
