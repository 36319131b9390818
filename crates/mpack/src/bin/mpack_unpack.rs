//! `mpack-unpack`: decode MessagePack (stdin) to JSON (stdout).
//!
//! Usage:
//!   mpack-unpack [--pretty] < doc.msgpack
//!
//! Concatenated values are printed one JSON document per line.

use std::io::{self, Read, Write};
use std::process::ExitCode;

use mpack::cli::{init_logging, unpack};

fn main() -> ExitCode {
    init_logging();

    let mut pretty = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pretty" | "-p" => pretty = true,
            other => {
                eprintln!("unknown argument: {other}");
                eprintln!("usage: mpack-unpack [--pretty]");
                return ExitCode::from(2);
            }
        }
    }

    let mut buf = Vec::new();
    if let Err(e) = io::stdin().read_to_end(&mut buf) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match unpack(&buf, pretty) {
        Ok(json) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(json.as_bytes()).and_then(|()| stdout.flush()) {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
