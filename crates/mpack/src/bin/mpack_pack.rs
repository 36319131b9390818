//! `mpack-pack`: encode JSON (stdin) to MessagePack (stdout).
//!
//! Usage:
//!   mpack-pack < doc.json > doc.msgpack

use std::io::{self, Read, Write};
use std::process::ExitCode;

use mpack::cli::{init_logging, pack};
use tracing::debug;

fn main() -> ExitCode {
    init_logging();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let bytes = match pack(buf.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(len = bytes.len(), "encoded document");

    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(&bytes).and_then(|()| stdout.flush()) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
