//! `delta-patch` — apply a delta to a JSON document.
//!
//! Usage:
//!   delta-patch '<delta-json>'
//!
//! The document is read from stdin; the patched document is printed to
//! stdout.

use std::io::{self, Read, Write};

use json_delta::cli::patch_document;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let delta = match args.get(1) {
        Some(d) => d.clone(),
        None => {
            eprintln!("First argument must be the delta as JSON.");
            std::process::exit(1);
        }
    };

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match patch_document(buf.trim(), &delta) {
        Ok(result) => {
            io::stdout().write_all(result.as_bytes()).unwrap();
            io::stdout().write_all(b"\n").unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
