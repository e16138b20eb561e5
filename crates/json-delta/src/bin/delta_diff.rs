//! `delta-diff` — compute the delta between two JSON documents.
//!
//! Usage:
//!   delta-diff '<target-json>' ['<policy-json>']
//!
//! The origin document is read from stdin; the delta is printed to stdout.

use std::io::{self, Read, Write};

use json_delta::cli::diff_documents;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let target = match args.get(1) {
        Some(t) => t.clone(),
        None => {
            eprintln!("First argument must be the target document as JSON.");
            std::process::exit(1);
        }
    };
    let policy = args.get(2).cloned();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match diff_documents(buf.trim(), &target, policy.as_deref()) {
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
