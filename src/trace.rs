//! Trace records and the reader that pulls them out of a trace file.
//!
//! A record looks like `<flag> <hexaddr>,<size>`, for example ` L 10,4` or
//! `M 7ff000388,8`. Leading whitespace is ignored.

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use enum_as_inner::EnumAsInner;
use eyre::{Result, WrapErr};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumAsInner)]
pub enum AccessKind {
    InstructionFetch,
    DataLoad,
    DataStore,
    /// a load immediately followed by a store to the same address
    DataModify,
    Invalid,
}

impl AccessKind {
    pub fn from_flag(flag: char) -> AccessKind {
        match flag {
            'I' => AccessKind::InstructionFetch,
            'L' => AccessKind::DataLoad,
            'S' => AccessKind::DataStore,
            'M' => AccessKind::DataModify,
            _ => AccessKind::Invalid,
        }
    }

    pub fn flag(&self) -> Option<char> {
        match self {
            AccessKind::InstructionFetch => Some('I'),
            AccessKind::DataLoad => Some('L'),
            AccessKind::DataStore => Some('S'),
            AccessKind::DataModify => Some('M'),
            AccessKind::Invalid => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    pub kind: AccessKind,
    pub address: u64,
    /// carried through for reporting, the model ignores it
    pub size: u32,
}

impl AccessRecord {
    /// Parse one trace line.
    ///
    /// An unknown flag or an empty line gives an `Invalid` record, the
    /// simulator decides what to do with it. A known flag with a bad address
    /// or size is an error right here.
    pub fn parse(line: &str) -> Result<AccessRecord, SimError> {
        let line = line.trim();
        let mut chars = line.chars();
        let kind = chars
            .next()
            .map(AccessKind::from_flag)
            .unwrap_or(AccessKind::Invalid);
        if kind.is_invalid() {
            return Ok(AccessRecord {
                kind,
                address: 0,
                size: 0,
            });
        }
        let parse_error = |reason: &'static str| SimError::Parse {
            line: line.to_string(),
            reason,
        };

        // the separator after the flag is optional, `L10,1` is accepted
        let (address, size) = chars
            .as_str()
            .trim_start()
            .split_once(',')
            .ok_or_else(|| parse_error("expected `<address>,<size>`"))?;
        let address = address.trim();
        let address = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .unwrap_or(address);
        let address =
            u64::from_str_radix(address, 16).map_err(|_| parse_error("bad hex address"))?;
        let size = size
            .trim()
            .parse::<u32>()
            .map_err(|_| parse_error("bad decimal size"))?;
        Ok(AccessRecord {
            kind,
            address,
            size,
        })
    }
}

/// renders the record the way it appears in a trace, without the leading space
impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = self.kind.flag().unwrap_or('?');
        write!(f, "{} {:x},{}", flag, self.address, self.size)
    }
}

/// Iterates over the records of a trace, one per line.
///
/// Yields `(line_no, record)` with 1-based line numbers; read and parse
/// errors carry the line number as context.
pub struct TraceReader<R> {
    reader: R,
    line_no: usize,
    buffer: String,
}

impl TraceReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimError::File {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("opened trace file {}", path.display());
        Ok(TraceReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader {
            reader,
            line_no: 0,
            buffer: String::new(),
        }
    }

    /// the number of the last line returned
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<(usize, AccessRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                self.line_no += 1;
                let line_no = self.line_no;
                Some(
                    AccessRecord::parse(&self.buffer)
                        .map(|record| (line_no, record))
                        .wrap_err_with(|| format!("at trace line {line_no}")),
                )
            }
            Err(e) => Some(Err(eyre::Report::new(e)
                .wrap_err(format!("cannot read trace line {}", self.line_no + 1)))),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;
    #[test]
    fn test_parse_kinds() {
        let record = AccessRecord::parse(" L 10,4\n").unwrap();
        assert_eq!(
            record,
            AccessRecord {
                kind: AccessKind::DataLoad,
                address: 0x10,
                size: 4
            }
        );
        assert!(AccessRecord::parse("I 0400d7d4,8").unwrap().kind.is_instruction_fetch());
        assert!(AccessRecord::parse(" S 7ff0005c8,8").unwrap().kind.is_data_store());
        let record = AccessRecord::parse(" M 0x20,1").unwrap();
        assert!(record.kind.is_data_modify());
        assert_eq!(record.address, 0x20);
    }

    #[test]
    fn test_parse_invalid_flag() {
        assert!(AccessRecord::parse("X 10,4").unwrap().kind.is_invalid());
        assert!(AccessRecord::parse("").unwrap().kind.is_invalid());
        assert!(AccessRecord::parse("   \n").unwrap().kind.is_invalid());
        assert!(AccessRecord::parse("l 10,4").unwrap().kind.is_invalid());
    }

    #[test]
    fn test_parse_malformed_numbers() {
        for line in ["L", "L 10", "L zz,1", "L 10,", "L 10,-1", "L 10,abc", "Lx1,1"] {
            match AccessRecord::parse(line) {
                Err(SimError::Parse { .. }) => {}
                other => panic!("{line:?} should not parse, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_without_separator() {
        let record = AccessRecord::parse("L10,1").unwrap();
        assert!(record.kind.is_data_load());
        assert_eq!((record.address, record.size), (0x10, 1));
        let record = AccessRecord::parse(" S\t7f,8").unwrap();
        assert_eq!((record.address, record.size), (0x7f, 8));
    }

    #[test]
    fn test_display() {
        let record = AccessRecord::parse(" S 7ff0005C8,8").unwrap();
        assert_eq!(record.to_string(), "S 7ff0005c8,8");
    }

    #[test]
    fn test_reader_line_numbers() {
        let trace = "I 0,1\n L 10,4\nS 20,8";
        let records: Vec<_> = TraceReader::new(Cursor::new(trace))
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].0, 2);
        assert_eq!(records[2].1.address, 0x20);
    }

    #[test]
    fn test_reader_error_keeps_kind() {
        let mut reader = TraceReader::new(Cursor::new("L 0,1\nL xyz,1\n"));
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::Parse { .. })
        ));
        assert!(format!("{err:?}").contains("line 2"));
        assert_eq!(reader.line_no(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let path = std::env::temp_dir().join("cachesim-no-such-trace.trace");
        let err = TraceReader::open(&path).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::File { .. })
        ));
    }
}
