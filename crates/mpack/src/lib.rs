//! MessagePack value model and codec.
//!
//! [`Value`] is an immutable tagged union covering every MessagePack type.
//! [`encode`] writes the canonical (shortest) encoding; [`decode`] reads any
//! valid encoding back, bounded by a nesting limit and with every read
//! checked against the input length.
//!
//! ```
//! use mpack::{decode, encode, Value};
//!
//! let v = Value::object([("a", Value::from(100i32)), ("b", Value::from(200i16))]);
//! let bytes = encode(&v).unwrap();
//! assert_eq!(bytes, [0x82, 0xa1, b'a', 0x64, 0xa1, b'b', 0xcc, 0xc8]);
//! assert_eq!(decode(&bytes).unwrap(), v);
//! ```

pub mod cli;
pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod input;
pub mod json;
pub mod stream;
pub mod util;
pub mod value;

pub use decoder::{DecodeOptions, Decoder, MultiDecode, DEFAULT_MAX_DEPTH};
pub use encoder::{Encoder, IoSink, Sink};
pub use error::{
    DecodeError, DecodeErrorKind, EncodeError, JsonError, ReadError, ShapeError,
};
pub use input::{Input, IoInput};
pub use json::{from_json, to_json};
pub use stream::{decode_from_reader, decode_from_reader_with, StreamDecoder};
pub use util::{decode, decode_multi, decode_partial, encode, encode_to, validate};
pub use value::{Object, Type, Value, NIL};
