//! Trace file driver: a lazy, line-at-a-time reader over the memory-access
//! trace format, terminated by the `#eof` sentinel.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::SimError;

/// Operation kind for a trace event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Read,
    Write,
}

/// One parsed trace line; the instruction address is discarded after parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEvent {
    pub op: Op,
    pub addr: u64,
}

/// Iterates the trace file one line at a time, stopping at `#eof`.
///
/// The file is opened with a buffered reader and closed when this reader (or
/// the file it wraps) is dropped, on every exit path, including a parse
/// failure partway through the trace.
pub struct TraceReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
    saw_eof: bool,
}

impl TraceReader {
    pub fn open(path: &Path) -> Result<Self, SimError> {
        let file = File::open(path).map_err(|source| SimError::TraceFileOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
            saw_eof: false,
        })
    }
}

impl Iterator for TraceReader {
    type Item = Result<TraceEvent, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.lines.next() {
                None => {
                    if self.saw_eof {
                        return None;
                    }
                    return Some(Err(SimError::MissingEofSentinel));
                }
                Some(Ok(line)) => line,
                Some(Err(source)) => {
                    return Some(Err(SimError::TraceFileRead {
                        path: self.path.clone(),
                        source,
                    }))
                }
            };
            self.line_no += 1;

            if raw == "#eof" {
                self.saw_eof = true;
                return None;
            }

            return Some(parse_trace_line(&raw, self.line_no));
        }
    }
}

fn parse_trace_line(line: &str, line_no: usize) -> Result<TraceEvent, SimError> {
    let malformed = || SimError::MalformedTraceLine {
        line_no,
        line: line.to_string(),
    };

    let (_instruction, rest) = line.split_once(':').ok_or_else(malformed)?;
    let rest = rest.trim_start();
    let mut fields = rest.splitn(2, ' ');
    let op_str = fields.next().ok_or_else(malformed)?;
    let addr_str = fields.next().ok_or_else(malformed)?.trim();

    let op = match op_str {
        "R" => Op::Read,
        "W" => Op::Write,
        _ => return Err(malformed()),
    };
    let addr = parse_hex(addr_str).ok_or_else(malformed)?;

    Ok(TraceEvent { op, addr })
}

fn parse_hex(s: &str) -> Option<u64> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_read_and_write() {
        let ev = parse_trace_line("0x7fff1234: R 0xdeadbeef", 1).unwrap();
        assert_eq!(ev.op, Op::Read);
        assert_eq!(ev.addr, 0xdeadbeef);

        let ev = parse_trace_line("0x0: W 0x0", 2).unwrap();
        assert_eq!(ev.op, Op::Write);
        assert_eq!(ev.addr, 0);
    }

    #[test]
    fn rejects_malformed_line() {
        assert!(parse_trace_line("not a trace line", 1).is_err());
        assert!(parse_trace_line("0x0 R 0x0", 1).is_err()); // missing ':'
        assert!(parse_trace_line("0x0: X 0x0", 1).is_err()); // bad op
    }

    #[test]
    fn reader_stops_at_eof_sentinel() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("cachesim2-trace-test-{}.trace", std::process::id()));
        std::fs::write(&path, "0x0: R 0x0\n0x4: W 0x10\n#eof\nignored after sentinel\n").unwrap();

        let events: Result<Vec<_>, _> = TraceReader::open(&path).unwrap().collect();
        std::fs::remove_file(&path).unwrap();

        let events = events.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].op, Op::Read);
        assert_eq!(events[1].op, Op::Write);
    }

    #[test]
    fn reader_errors_without_eof_sentinel() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("cachesim2-trace-test-noeof-{}.trace", std::process::id()));
        std::fs::write(&path, "0x0: R 0x0\n").unwrap();

        let events: Result<Vec<_>, _> = TraceReader::open(&path).unwrap().collect();
        std::fs::remove_file(&path).unwrap();

        assert!(events.is_err());
    }
}
