//! Operator-facing console output.
//!
//! Progress lines and the final banner are advisory. A closed or broken
//! stream must never abort a run, so every write here is fallible and
//! errors are dropped after a debug log.

use std::fmt::Display;
use std::io::{self, Write};
use tracing::debug;

/// Writes one progress line to stdout.
pub fn line(text: impl Display) {
    write_line(&mut io::stdout().lock(), text);
}

/// Writes one line to stderr.
pub fn error_line(text: impl Display) {
    write_line(&mut io::stderr().lock(), text);
}

/// Echoes captured command output to stdout. Nothing is written for empty
/// output, and a missing trailing newline is added.
pub fn block(text: &str) {
    write_block(&mut io::stdout().lock(), text);
}

fn write_line<W: Write>(out: &mut W, text: impl Display) -> bool {
    report(writeln!(out, "{text}").and_then(|()| out.flush()))
}

fn write_block<W: Write>(out: &mut W, text: &str) -> bool {
    if text.is_empty() {
        return true;
    }
    let written = if text.ends_with('\n') {
        out.write_all(text.as_bytes())
    } else {
        writeln!(out, "{text}")
    };
    report(written.and_then(|()| out.flush()))
}

fn report(result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => false,
        Err(error) => {
            debug!(%error, "Console write failed");
            false
        }
    }
}
