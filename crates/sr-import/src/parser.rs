//! Flat-file parsing for SR data files
//!
//! # File Format
//! One record per line, CR/LF terminated. Fields are separated by `^` and text
//! fields are wrapped in `~`:
//!
//! ```text
//! ~01001~^~0100~^~Butter, salted~^~BUTTER,WITH SALT~^~~^~~^~Y~^~~^0^~~^6.38^4.27^8.79^3.87
//! ```
//!
//! Files are ISO-8859-1 encoded. Older releases end with a DOS end-of-file
//! byte (0x1A) on its own line.

use sr_common::{Result, SrError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

const FIELD_SEPARATOR: u8 = b'^';
const TEXT_DELIMITER: u8 = b'~';
const DOS_EOF: u8 = 0x1A;

/// One data row and the 1-based line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub line: usize,
    pub values: Vec<String>,
}

/// Lazy sequence of rows from one file
pub type RowIter = Box<dyn Iterator<Item = Result<Row>> + Send>;

/// Turns a data file into rows of column values
pub trait RecordParser: Send + Sync {
    /// Open `path` for a single pass; each call starts from the first row
    fn open(&self, path: &Path) -> Result<RowIter>;
}

/// Parser for the caret-separated, tilde-quoted SR format
#[derive(Debug, Clone, Copy, Default)]
pub struct CaretParser;

impl RecordParser for CaretParser {
    fn open(&self, path: &Path) -> Result<RowIter> {
        let file = open_data_file(path)?;
        Ok(Box::new(CaretRows {
            reader: BufReader::new(file),
            buf: Vec::new(),
            line: 0,
            failed: false,
        }))
    }
}

struct CaretRows {
    reader: BufReader<File>,
    buf: Vec<u8>,
    line: usize,
    failed: bool,
}

impl Iterator for CaretRows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    let content = trim_line_ending(&self.buf);
                    if content.is_empty() || content == [DOS_EOF] {
                        continue;
                    }
                    return Some(Ok(Row {
                        line: self.line,
                        values: split_fields(content),
                    }));
                },
                Err(e) => {
                    self.failed = true;
                    return Some(Err(SrError::Io(e)));
                },
            }
        }
    }
}

fn open_data_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        SrError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open data file {}: {}", path.display(), e),
        ))
    })
}

fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    while let Some((&last, rest)) = line.split_last() {
        if last == b'\n' || last == b'\r' {
            line = rest;
        } else {
            break;
        }
    }
    line
}

/// Split one line (without its terminator) into column values
pub fn split_fields(line: &[u8]) -> Vec<String> {
    line.split(|&b| b == FIELD_SEPARATOR)
        .map(|field| decode_latin1(strip_text_delimiters(field)))
        .collect()
}

fn strip_text_delimiters(field: &[u8]) -> &[u8] {
    match field {
        [TEXT_DELIMITER, inner @ .., TEXT_DELIMITER] => inner,
        _ => field,
    }
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Estimate the number of rows in `path` by counting line terminators
///
/// A final line without a terminator counts as one more. Blank lines and the
/// DOS end-of-file marker are included, so the result can exceed the number
/// of rows the parser yields.
pub fn count_lines(path: &Path) -> Result<u64> {
    let mut reader = BufReader::new(open_data_file(path)?);
    let mut buf = [0u8; 64 * 1024];
    let mut count = 0u64;
    let mut last = None;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        count += buf[..n].iter().filter(|&&b| b == b'\n').count() as u64;
        last = Some(buf[n - 1]);
    }

    if matches!(last, Some(b) if b != b'\n') {
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_split_fields() {
        let values = split_fields(b"~01001~^~0100~^~Butter, salted~^~~^0^^6.38");
        assert_eq!(values, vec!["01001", "0100", "Butter, salted", "", "0", "", "6.38"]);
    }

    #[test]
    fn test_latin1_decoding() {
        let values = split_fields(b"~Cr\xe8me fra\xeeche~^1");
        assert_eq!(values[0], "Crème fraîche");
    }

    #[test]
    fn test_parse_file() {
        let file = write_file(b"~0100~^~Dairy and Egg Products~\r\n~0200~^~Spices and Herbs~\r\n\x1a");
        let rows: Vec<Row> = CaretParser
            .open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].values, vec!["0100", "Dairy and Egg Products"]);
        assert_eq!(rows[1].values, vec!["0200", "Spices and Herbs"]);
    }

    #[test]
    fn test_skips_blank_lines_and_keeps_line_numbers() {
        let file = write_file(b"~a~^1\n\n~b~^2");
        let rows: Vec<Row> = CaretParser
            .open(file.path())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].values, vec!["b", "2"]);
    }

    #[test]
    fn test_reopen_restarts() {
        let file = write_file(b"~a~\n~b~\n");
        let parser = CaretParser;
        assert_eq!(parser.open(file.path()).unwrap().count(), 2);
        assert_eq!(parser.open(file.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_open_missing_file() {
        let err = CaretParser.open(Path::new("/no/such/FOOD_DES.txt")).err().unwrap();
        assert!(err.to_string().contains("FOOD_DES.txt"));
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines(write_file(b"").path()).unwrap(), 0);
        assert_eq!(count_lines(write_file(b"a\nb\n").path()).unwrap(), 2);
        assert_eq!(count_lines(write_file(b"a\nb").path()).unwrap(), 2);
        assert_eq!(count_lines(write_file(b"a\r\nb\r\n\n").path()).unwrap(), 3);
    }
}
