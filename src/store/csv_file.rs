use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{
    check_foreign_header, decode_rows, encode_rows, header_row, Decoded, RecordStore, SchemaPolicy,
};
use crate::error::StoreError;
use crate::models::{Application, RecordSet};

/// Record set kept in a local UTF-8 CSV file.
pub struct CsvStore {
    path: PathBuf,
    policy: SchemaPolicy,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>, policy: SchemaPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn write_rows(&self, rows: &[Vec<String>]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let mut writer = csv::Writer::from_path(&self.path)?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

/// 1-based line of the record that starts at `byte`.
///
/// The reader records a position before it skips blank lines, so step over
/// any line terminators first.
fn line_of(content: &str, byte: u64) -> usize {
    let bytes = content.as_bytes();
    let mut start = usize::try_from(byte).map_or(bytes.len(), |b| b.min(bytes.len()));
    while start < bytes.len() && matches!(bytes[start], b'\r' | b'\n') {
        start += 1;
    }
    1 + bytes[..start].iter().filter(|&&b| b == b'\n').count()
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<RecordSet, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no CSV file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        let rows = reader
            .records()
            .enumerate()
            .map(|(idx, record)| {
                let record = record?;
                let line = record
                    .position()
                    .map_or(idx + 1, |pos| line_of(&content, pos.byte()));
                let cells: Vec<String> = record.iter().map(str::to_string).collect();
                Ok::<_, csv::Error>((line, cells))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match decode_rows(rows)? {
            Decoded::Empty => Ok(Vec::new()),
            Decoded::Records(records) => {
                debug!(path = %self.path.display(), count = records.len(), "loaded applications");
                Ok(records)
            }
            Decoded::ForeignHeader(header) => {
                check_foreign_header(self.policy, &self.describe(), &header)?;
                self.write_rows(&[header_row()])?;
                Ok(Vec::new())
            }
        }
    }

    fn replace_all(&self, records: &[Application]) -> Result<(), StoreError> {
        self.write_rows(&encode_rows(records))?;
        debug!(path = %self.path.display(), count = records.len(), "rewrote CSV file");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path().display())
    }
}
