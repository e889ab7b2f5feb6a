//! XML Round-trip Example
//!
//! Reads the XML file named on the command line, parses it, and prints it back to stdout.
//!
//! `cargo run --example roundtrip -- tests/good.xml [--normalize] [--escape]`
use std::io::Write;
use xmlarena::{Document, ParseFlags, TextEscape};

fn main() {
    let mut path = None;
    let mut flags = ParseFlags::default();
    let mut escape = TextEscape::Verbatim;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--normalize" => flags |= ParseFlags::NORMALIZE_SPACE,
            "--escape" => escape = TextEscape::Entities,
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        eprintln!("Usage: roundtrip <file.xml> [--normalize] [--escape]");
        std::process::exit(2);
    };

    //
    // The document borrows this buffer, and decodes entities into it in place
    let mut buffer = match std::fs::read(&path) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("Could not read {path}: {e}");
            std::process::exit(1);
        }
    };

    //
    // If an error occurs, the error message is designed to be human-readable;
    //      |   <b></c>
    //      = At 3:7
    //      = Parse error: Unmatched element type
    let mut document = Document::new();
    if let Err(e) = document.parse(&mut buffer, flags) {
        eprintln!("Error parsing {path}:\n{e}");
        std::process::exit(1);
    }

    if let Some(declaration) = document.declaration() {
        eprintln!("XML version {}", declaration.version());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = document
        .print_with(&mut out, escape)
        .and_then(|()| Ok(out.write_all(b"\n")?));
    if let Err(e) = result {
        eprintln!("Error writing output:\n{e}");
        std::process::exit(1);
    }
}
