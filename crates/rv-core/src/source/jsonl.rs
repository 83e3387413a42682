//! Newline-delimited JSON record source.
//!
//! Each non-blank line is one [`SourceEntry`] tagged by `"kind"`:
//!
//! ```text
//! {"kind":"aux","key":"redis-ver","value":"7.2.4"}
//! {"kind":"db_size","db":0,"keys":2,"expires":1}
//! {"kind":"key","db":0,"key":"user:1","type":"hash","size":512,"encoding":"listpack","elements":4}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rv_common::{Error, Result, SourceEntry};

use super::RecordSource;

/// Reads one entry per line from any buffered reader.
pub struct JsonlSource<R> {
    reader: R,
    line: u64,
    bytes: u64,
    total: Option<u64>,
    buf: String,
    done: bool,
}

impl JsonlSource<BufReader<File>> {
    /// Open a file; its length becomes the progress denominator.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::InputOpen {
            path: path.to_path_buf(),
            source: e,
        })?;
        let total = file.metadata().ok().map(|m| m.len());
        Ok(Self::from_reader(BufReader::new(file)).with_total_bytes(total))
    }
}

impl<R: BufRead> JsonlSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            bytes: 0,
            total: None,
            buf: String::new(),
            done: false,
        }
    }

    pub fn with_total_bytes(mut self, total: Option<u64>) -> Self {
        self.total = total;
        self
    }

    /// 1-based number of the last line read.
    pub fn line(&self) -> u64 {
        self.line
    }

    fn fail(&mut self, line: u64, message: String) -> Option<Result<SourceEntry>> {
        self.done = true;
        Some(Err(Error::Decode { line, message }))
    }
}

impl<R: BufRead> Iterator for JsonlSource<R> {
    type Item = Result<SourceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    self.bytes += n as u64;
                    self.line += 1;
                    let text = self.buf.trim();
                    if text.is_empty() {
                        continue;
                    }
                    return match serde_json::from_str::<SourceEntry>(text) {
                        Ok(entry) => Some(Ok(entry)),
                        Err(e) => self.fail(self.line, e.to_string()),
                    };
                }
                Err(e) => return self.fail(self.line + 1, e.to_string()),
            }
        }
    }
}

impl<R: BufRead> RecordSource for JsonlSource<R> {
    fn bytes_consumed(&self) -> u64 {
        self.bytes
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_common::KeyType;
    use std::io::{Cursor, Write};

    fn source(text: &str) -> JsonlSource<Cursor<Vec<u8>>> {
        JsonlSource::from_reader(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_reads_all_kinds_and_skips_blank_lines() {
        let text = concat!(
            r#"{"kind":"aux","key":"redis-ver","value":"7.2.4"}"#,
            "\n\n",
            r#"{"kind":"db_size","db":0,"keys":1,"expires":0}"#,
            "\n",
            r#"{"kind":"key","db":0,"key":"a","type":"string","size":3}"#,
            "\n",
        );
        let mut src = source(text);
        let entries: Vec<_> = src.by_ref().collect::<Result<_>>().unwrap();

        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0], SourceEntry::Aux(_)));
        assert!(matches!(entries[1], SourceEntry::DbSize { db: 0, .. }));
        match &entries[2] {
            SourceEntry::Key(record) => {
                assert_eq!(record.key_type, KeyType::String);
                assert_eq!(record.encoding, "");
                assert_eq!(record.element_count, 0);
            }
            other => panic!("expected key, got {:?}", other),
        }
        assert_eq!(src.bytes_consumed(), text.len() as u64);
        assert_eq!(src.line(), 4);
    }

    #[test]
    fn test_malformed_line_reports_line_number_and_stops() {
        let text = concat!(
            r#"{"kind":"key","db":0,"key":"a","type":"string","size":3}"#,
            "\n",
            r#"{"kind":"key","db":0,"key":"b""#,
            "\n",
            r#"{"kind":"key","db":0,"key":"c","type":"string","size":3}"#,
            "\n",
        );
        let mut src = source(text);
        assert!(src.next().unwrap().is_ok());
        match src.next() {
            Some(Err(Error::Decode { line, .. })) => assert_eq!(line, 2),
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(src.next().is_none());
    }

    #[test]
    fn test_unknown_kind_is_decode_error() {
        let mut src = source("{\"kind\":\"module_aux\"}\n");
        assert!(matches!(src.next(), Some(Err(Error::Decode { line: 1, .. }))));
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let mut src = JsonlSource::from_reader(Cursor::new(vec![0xff, 0xfe, b'\n']));
        assert!(matches!(src.next(), Some(Err(Error::Decode { line: 1, .. }))));
    }

    #[test]
    fn test_open_uses_file_length_as_total() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let mut file = File::create(&path).unwrap();
        writeln!(file, r#"{{"kind":"key","db":0,"key":"k","type":"set","size":1}}"#).unwrap();
        drop(file);

        let src = JsonlSource::open(&path).unwrap();
        assert_eq!(
            src.total_bytes(),
            Some(std::fs::metadata(&path).unwrap().len())
        );
    }

    #[test]
    fn test_open_missing_file() {
        let err = JsonlSource::open(Path::new("/nonexistent/records.jsonl"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::InputOpen { .. }));
    }
}
