//! Core logic behind the `mpack-pack` and `mpack-unpack` binaries.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::{decode_multi, encode, from_json, to_json, DecodeError, EncodeError, JsonError};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("cannot render as JSON: {0}")]
    Render(#[from] JsonError),
    #[error("invalid MessagePack after {values} value(s): {source}")]
    Decode { values: usize, source: DecodeError },
}

/// Installs a stderr `fmt` subscriber, `warn` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses one JSON document and encodes it as MessagePack.
pub fn pack(json: &str) -> Result<Vec<u8>, CliError> {
    let doc: serde_json::Value = serde_json::from_str(json)?;
    Ok(encode(&from_json(&doc))?)
}

/// Renders every concatenated MessagePack value in `bytes` as one JSON
/// document per line.
pub fn unpack(bytes: &[u8], pretty: bool) -> Result<String, CliError> {
    let out = decode_multi(bytes);
    if let Some(source) = out.error {
        return Err(CliError::Decode {
            values: out.values.len(),
            source,
        });
    }
    let mut text = String::new();
    for value in &out.values {
        let json = to_json(value)?;
        let rendered = if pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        text.push_str(&rendered);
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_then_unpack() {
        let bytes = pack(r#"{"a": [1, -2, 2.5], "b": "x"}"#).unwrap();
        assert_eq!(bytes[0], 0x82);
        assert_eq!(unpack(&bytes, false).unwrap(), "{\"a\":[1,-2,2.5],\"b\":\"x\"}\n");
    }

    #[test]
    fn unpack_concatenated() {
        assert_eq!(unpack(&[0x01, 0xc3, 0xc0], false).unwrap(), "1\ntrue\nnull\n");
        assert_eq!(unpack(&[], false).unwrap(), "");
    }

    #[test]
    fn unpack_pretty() {
        assert_eq!(unpack(&[0x91, 0x01], true).unwrap(), "[\n  1\n]\n");
    }

    #[test]
    fn errors() {
        assert!(matches!(pack("{"), Err(CliError::Json(_))));
        let err = unpack(&[0x01, 0xc1], false).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid MessagePack after 1 value(s): invalid byte 0xc1 at offset 1"
        );
        // {1: "int", "1": "str"}
        let colliding = [0x82, 0x01, 0xa3, b'i', b'n', b't', 0xa1, b'1', 0xa3, b's', b't', b'r'];
        assert!(matches!(
            unpack(&colliding, false),
            Err(CliError::Render(JsonError::DuplicateKey { .. }))
        ));
    }
}
