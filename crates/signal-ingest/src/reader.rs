//! Delimited Text Reader

use crate::error::ValidationError;
use crate::table::RawTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Field separator
    pub delimiter: char,
    /// Largest accepted input in bytes (200 MiB)
    pub max_bytes: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            max_bytes: 200 * 1024 * 1024,
        }
    }
}

/// Reads header-less delimited text into a [`RawTable`]
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    config: ReaderConfig,
}

impl TableReader {
    /// Create a new reader with given config
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Parse text into a table.
    ///
    /// A leading byte order mark and blank lines are skipped. Quoted fields may contain
    /// the delimiter. The first row fixes the width: shorter rows are padded with empty
    /// cells, longer rows are rejected.
    pub fn read_str(&self, text: &str) -> Result<RawTable, ValidationError> {
        if text.len() as u64 > self.config.max_bytes {
            return Err(ValidationError::FileTooLarge {
                size: text.len() as u64,
                limit: self.config.max_bytes,
            });
        }

        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut width = 0;

        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let mut cells = split_fields(line, self.config.delimiter);

            if rows.is_empty() {
                width = cells.len();
            } else if cells.len() > width {
                return Err(ValidationError::Malformed(format!(
                    "Expected {} fields in line {}, saw {}",
                    width,
                    line_no + 1,
                    cells.len()
                )));
            } else {
                cells.resize(width, String::new());
            }

            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(ValidationError::Empty);
        }

        debug!("Read table: {} rows x {} columns", rows.len(), width);
        Ok(RawTable::new(rows))
    }

    /// Read a file from disk, enforcing the size limit before loading it
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<RawTable, ValidationError> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                limit: self.config.max_bytes,
            });
        }

        let text = std::fs::read_to_string(path)?;
        self.read_str(&text)
    }
}

/// Split one line on `delimiter`, ignoring delimiters inside double quotes
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == delimiter && !in_quotes {
            fields.push(clean_field(&line[start..i]));
            start = i + c.len_utf8();
        }
    }
    fields.push(clean_field(&line[start..]));
    fields
}

fn clean_field(raw: &str) -> String {
    let cell = raw.trim();
    match cell.strip_prefix('"').and_then(|c| c.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => cell.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows() {
        let table = TableReader::default()
            .read_str("1,2,3\n4, 5 ,6\r\n\n7,8,9\n")
            .unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row(1).unwrap(), &["4", "5", "6"]);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = TableReader::default().read_str("1,2,3\n4\n").unwrap();
        assert_eq!(table.row(1).unwrap(), &["4", "", ""]);
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = TableReader::default().read_str("1,2\n3,4,5\n").unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(_)));
    }

    #[test]
    fn test_empty_text() {
        let reader = TableReader::default();
        assert_eq!(reader.read_str("").unwrap_err(), ValidationError::Empty);
        assert_eq!(reader.read_str("\n  \n").unwrap_err(), ValidationError::Empty);
    }

    #[test]
    fn test_quoted_cells() {
        let table = TableReader::default().read_str("\"1.5\",2\n").unwrap();
        assert_eq!(table.row(0).unwrap(), &["1.5", "2"]);
    }

    #[test]
    fn test_quoted_delimiter_stays_in_cell() {
        let table = TableReader::default()
            .read_str("\"1,5\",2,3\n\"a \"\"b\"\"\",4,5\n")
            .unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row(0).unwrap(), &["1,5", "2", "3"]);
        assert_eq!(table.row(1).unwrap(), &["a \"b\"", "4", "5"]);
    }

    #[test]
    fn test_byte_order_mark_is_stripped() {
        let text = "\u{feff}2,-1,1,-1\n1,2,3,4\n";
        let table = TableReader::default().read_str(text).unwrap();
        assert_eq!(table.row(0).unwrap(), &["2", "-1", "1", "-1"]);
    }

    #[test]
    fn test_size_limit() {
        let reader = TableReader::new(ReaderConfig {
            max_bytes: 4,
            ..Default::default()
        });
        let err = reader.read_str("1,2,3,4").unwrap_err();
        assert_eq!(err, ValidationError::FileTooLarge { size: 7, limit: 4 });
    }

    #[test]
    fn test_missing_file() {
        let err = TableReader::default()
            .read_file("/nonexistent/signal.csv")
            .unwrap_err();
        assert!(matches!(err, ValidationError::Io(_)));
    }
}
