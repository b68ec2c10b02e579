// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-by-line scanning of subprocess output.

use crate::error::PlaybackError;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};

/// Which output stream of a subprocess to scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStream {
    /// Standard output
    #[default]
    Stdout,
    /// Diagnostic output
    Stderr,
}

/// Run `program` and call `callback` once per output line.
///
/// Lines are decoded lossily and stripped of their terminator. Returning
/// `false` from the callback kills the process and ends the scan. Returns
/// the exit code, `None` if the process ended by a signal (including the
/// early kill).
pub fn scan_lines<P, I, S, F>(
    program: P,
    args: I,
    stream: ScanStream,
    mut callback: F,
) -> Result<Option<i32>, PlaybackError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    F: FnMut(&str) -> bool,
{
    let program = program.as_ref();
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null());
    match stream {
        ScanStream::Stdout => command.stdout(Stdio::piped()).stderr(Stdio::null()),
        ScanStream::Stderr => command.stdout(Stdio::null()).stderr(Stdio::piped()),
    };
    let mut child = command.spawn().map_err(|source| PlaybackError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;

    let reader: Option<Box<dyn Read>> = match stream {
        ScanStream::Stdout => child.stdout.take().map(|s| Box::new(s) as Box<dyn Read>),
        ScanStream::Stderr => child.stderr.take().map(|s| Box::new(s) as Box<dyn Read>),
    };
    if let Some(reader) = reader {
        let stopped = for_each_line(reader, |line| {
            tracing::trace!("{}", line);
            callback(line)
        });
        if stopped {
            tracing::debug!("Scan of {:?} stopped early", program);
            // The process may already be gone
            let _ = child.kill();
        }
    }

    let status = child.wait().map_err(|source| PlaybackError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;
    Ok(status.code())
}

/// Feed every line of `reader` to `callback`; returns `true` if the callback stopped early
pub(crate) fn for_each_line<R: Read>(reader: R, mut callback: impl FnMut(&str) -> bool) -> bool {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return false,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                if !callback(line.trim_end_matches(['\n', '\r'])) {
                    return true;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                tracing::warn!("Stopped reading subprocess output: {}", e);
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_each_line_splits_and_strips() {
        let input: &[u8] = b"first\r\nsecond\n\nlast without newline";
        let mut lines = Vec::new();
        let stopped = for_each_line(input, |line| {
            lines.push(line.to_string());
            true
        });
        assert!(!stopped);
        assert_eq!(lines, vec!["first", "second", "", "last without newline"]);
    }

    #[test]
    fn test_for_each_line_is_lossy() {
        let input: &[u8] = b"caf\xe9\nok\n";
        let mut lines = Vec::new();
        for_each_line(input, |line| {
            lines.push(line.to_string());
            true
        });
        assert_eq!(lines, vec!["caf\u{fffd}", "ok"]);
    }

    #[test]
    fn test_for_each_line_stops_early() {
        let input: &[u8] = b"a\nb\nc\n";
        let mut count = 0;
        let stopped = for_each_line(input, |_| {
            count += 1;
            count < 2
        });
        assert!(stopped);
        assert_eq!(count, 2);
    }
}
