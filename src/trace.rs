//! Reference trace input.
//!
//! One access per line: `<type> <hex-vaddr> <dec-byte>`, with type one of
//! `I`, `L`, `S`, `M`. Lines starting with `=` are comments.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::TraceError;
use crate::translation::{AccessType, VirtualAddress};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// 1-based line in the trace
    pub line: usize,
    pub access: AccessType,
    pub vaddr: VirtualAddress,
    /// Byte to store, or the byte a load/fetch must observe
    pub value: u8,
}

/// Parse one trace line. Comments and blank lines give `Ok(None)`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<TraceRecord>, TraceError> {
    if text.starts_with('=') || text.trim().is_empty() {
        return Ok(None);
    }

    let malformed = || TraceError::Malformed { line, text: text.trim_end().to_string() };

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(malformed());
    }

    let mut type_chars = tokens[0].chars();
    let access = match (type_chars.next(), type_chars.next()) {
        (Some(c), None) => AccessType::from_char(c),
        _ => None,
    }
    .ok_or_else(|| TraceError::InvalidAccessType { line, text: text.trim_end().to_string() })?;

    let hex = tokens[1]
        .strip_prefix("0x")
        .or_else(|| tokens[1].strip_prefix("0X"))
        .unwrap_or(tokens[1]);
    let raw = u64::from_str_radix(hex, 16).map_err(|_| malformed())?;
    let value: u8 = tokens[2].parse().map_err(|_| malformed())?;

    let vaddr = VirtualAddress::from_raw(raw);
    if !vaddr.offset_in_frame() {
        return Err(TraceError::InvalidOffset { line, text: text.trim_end().to_string() });
    }

    Ok(Some(TraceRecord { line, access, vaddr, value }))
}

/// Iterator over the records of a trace, skipping comments
pub struct TraceReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader { lines: reader.lines(), line: 0 }
    }
}

impl TraceReader<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line += 1;
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(source) => return Some(Err(TraceError::Io { line: self.line, source })),
            };
            match parse_line(self.line, &text) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_valid_line() {
        let rec = parse_line(1, "L 7fff00001004 12").unwrap().unwrap();
        assert_eq!(rec.access, AccessType::Load);
        assert_eq!(rec.vaddr.raw, 0x7fff_0000_1004);
        assert_eq!(rec.vaddr.offset, 4);
        assert_eq!(rec.value, 12);
        assert_eq!(rec.line, 1);
    }

    #[test]
    fn test_parse_accepts_hex_prefix() {
        let rec = parse_line(2, "S 0x1000 255").unwrap().unwrap();
        assert_eq!(rec.vaddr.raw, 0x1000);
        assert_eq!(rec.value, 255);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        assert!(parse_line(1, "==12345== valgrind banner").unwrap().is_none());
        assert!(parse_line(2, "").unwrap().is_none());
        assert!(parse_line(3, "   ").unwrap().is_none());
    }

    #[test]
    fn test_wrong_field_count() {
        let err = parse_line(4, "L 1000").unwrap_err();
        assert!(matches!(err, TraceError::Malformed { line: 4, .. }));
        assert!(parse_line(5, "L 1000 0 extra").is_err());
    }

    #[test]
    fn test_bad_numbers() {
        assert!(matches!(parse_line(1, "L zz 0"), Err(TraceError::Malformed { .. })));
        assert!(matches!(parse_line(1, "L 1000 256"), Err(TraceError::Malformed { .. })));
        assert!(matches!(parse_line(1, "L 1000 -1"), Err(TraceError::Malformed { .. })));
    }

    #[test]
    fn test_invalid_access_type() {
        let err = parse_line(9, "X 1000 0").unwrap_err();
        assert!(matches!(err, TraceError::InvalidAccessType { line: 9, .. }));
        assert!(parse_line(9, "LS 1000 0").is_err());
        assert_eq!(err.line(), 9);
    }

    #[test]
    fn test_offset_beyond_frame() {
        assert!(parse_line(1, "L 100f 0").is_ok());
        let err = parse_line(3, "L 1010 0").unwrap_err();
        assert!(matches!(err, TraceError::InvalidOffset { line: 3, .. }));
    }

    #[test]
    fn test_reader_counts_lines_across_comments() {
        let input = "= header\nS 1000 5\n\nL 1000 5\n";
        let records: Vec<_> = TraceReader::new(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 4);
        assert_eq!(records[1].access, AccessType::Load);
    }

    #[test]
    fn test_reader_reports_error_line() {
        let input = "S 1000 5\nbogus\n";
        let mut reader = TraceReader::new(Cursor::new(input));
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert_eq!(err.line(), 2);
    }
}
