//! Backing media for the record set.
//!
//! Every medium is a rectangular table whose first row is the canonical
//! header (`models::COLUMNS`). Reads load the whole table and writes replace
//! it wholesale; there is no incremental update path and no locking, so two
//! sessions writing the same medium race with last-writer-wins.

mod csv_file;
mod sheets;

pub use csv_file::CsvStore;
pub use sheets::{SheetsStore, DEFAULT_SPREADSHEET};

use tracing::warn;

use crate::error::StoreError;
use crate::models::{
    parse_date, split_links, Application, ApplicationStatus, ConnectionStatus, RecordSet, COLUMNS,
    LINK_SEPARATOR, PLACEHOLDER_LINK,
};

pub trait RecordStore {
    /// Read the full record set. A missing or empty medium yields an empty set.
    fn load(&self) -> Result<RecordSet, StoreError>;

    /// Erase the medium and write the header followed by every record in order.
    ///
    /// Not atomic: a failure part-way leaves the medium indeterminate.
    fn replace_all(&self, records: &[Application]) -> Result<(), StoreError>;

    fn describe(&self) -> String;
}

/// What `load` does when the medium's header is not the canonical one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Clear the medium, write the canonical header, return no records.
    /// Whatever the medium held is lost.
    #[default]
    Reset,
    /// Leave the medium alone and fail with `StoreError::SchemaMismatch`.
    Refuse,
}

#[derive(Debug)]
pub(crate) enum Decoded {
    Empty,
    Records(RecordSet),
    ForeignHeader(Vec<String>),
}

pub(crate) fn header_row() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Header plus one row per record, in the canonical column order.
pub(crate) fn encode_rows(records: &[Application]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(header_row());
    for record in records {
        rows.push(vec![
            record.company.clone(),
            record.joined_links(),
            record.date_string(),
            record.connection_status.label().to_string(),
            record.application_status.label().to_string(),
        ]);
    }
    rows
}

/// Pair each row with its 1-based row number, for media without gaps.
pub(crate) fn numbered(rows: Vec<Vec<String>>) -> Vec<(usize, Vec<String>)> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| (idx + 1, row))
        .collect()
}

/// Decode `(row number, cells)` pairs, the first non-blank one being the header.
pub(crate) fn decode_rows(rows: Vec<(usize, Vec<String>)>) -> Result<Decoded, StoreError> {
    let mut rows = rows
        .into_iter()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()));

    let Some((_, header)) = rows.next() else {
        return Ok(Decoded::Empty);
    };
    if header != COLUMNS {
        return Ok(Decoded::ForeignHeader(header));
    }

    rows.map(|(row_number, row)| decode_record(row_number, row))
        .collect::<Result<RecordSet, _>>()
        .map(Decoded::Records)
}

fn decode_record(row_number: usize, mut row: Vec<String>) -> Result<Application, StoreError> {
    let malformed = |reason: String| StoreError::MalformedRow {
        row: row_number,
        reason,
    };

    if row.len() > COLUMNS.len() {
        return Err(malformed(format!(
            "expected {} cells, found {}",
            COLUMNS.len(),
            row.len()
        )));
    }
    // Hosted sheets drop trailing empty cells.
    row.resize(COLUMNS.len(), String::new());

    let company = row[0].trim().to_string();
    if company.is_empty() {
        return Err(malformed("empty company".to_string()));
    }

    let mut job_links = split_links(&row[1], LINK_SEPARATOR);
    if job_links.is_empty() {
        job_links.push(PLACEHOLDER_LINK.to_string());
    }

    let date_applied =
        parse_date(&row[2]).map_err(|e| malformed(format!("bad date '{}': {}", row[2], e)))?;
    let connection_status = row[3]
        .parse::<ConnectionStatus>()
        .map_err(|e| malformed(e.to_string()))?;
    let application_status = row[4]
        .parse::<ApplicationStatus>()
        .map_err(|e| malformed(e.to_string()))?;

    Ok(Application {
        company,
        job_links,
        date_applied,
        connection_status,
        application_status,
    })
}

/// Apply the schema policy to a foreign header. `Ok` means the caller resets.
pub(crate) fn check_foreign_header(
    policy: SchemaPolicy,
    medium: &str,
    header: &[String],
) -> Result<(), StoreError> {
    let found = header.join(",");
    match policy {
        SchemaPolicy::Reset => {
            warn!(
                medium,
                found = %found,
                "foreign header; resetting medium to an empty record set"
            );
            Ok(())
        }
        SchemaPolicy::Refuse => Err(StoreError::SchemaMismatch {
            medium: medium.to_string(),
            found,
        }),
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory media for query and session tests.

    use std::cell::{Cell, RefCell};

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub records: RefCell<RecordSet>,
        pub writes: Cell<usize>,
        pub fail_writes: Cell<bool>,
    }

    impl MemoryStore {
        pub fn with(records: RecordSet) -> Self {
            Self {
                records: RefCell::new(records),
                ..Self::default()
            }
        }
    }

    impl RecordStore for MemoryStore {
        fn load(&self) -> Result<RecordSet, StoreError> {
            Ok(self.records.borrow().clone())
        }

        fn replace_all(&self, records: &[Application]) -> Result<(), StoreError> {
            if self.fail_writes.get() {
                return Err(StoreError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            self.writes.set(self.writes.get() + 1);
            *self.records.borrow_mut() = records.to_vec();
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{parse_date, Application, ApplicationStatus, ConnectionStatus};

    pub fn app(company: &str, date: &str) -> Application {
        Application {
            company: company.to_string(),
            job_links: vec![format!("https://{}.example/jobs/1", company.to_lowercase())],
            date_applied: parse_date(date).unwrap(),
            connection_status: ConnectionStatus::Sent,
            application_status: ApplicationStatus::Applied,
        }
    }
}
