//! Lookups and single-record mutations over an in-memory record set.
//!
//! Mutations persist by handing the whole set to `RecordStore::replace_all`.
//! If that write fails the in-memory set is restored, so the caller can
//! treat it as the last known good state and retry.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::TrackerError;
use crate::models::{
    Application, ApplicationStatus, ConnectionStatus, NewApplication, LINK_SEPARATOR,
    PLACEHOLDER_LINK,
};
use crate::store::RecordStore;

/// Sorted, unique, lowercased company names containing `query`.
///
/// An empty query matches every company.
pub fn find_by_company(records: &[Application], query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    records
        .iter()
        .map(|r| r.company.to_lowercase())
        .filter(|name| name.contains(&query))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Records whose company equals `company` ignoring case, with their positions.
pub fn select_records_for_company<'a>(
    records: &'a [Application],
    company: &str,
) -> Vec<(usize, &'a Application)> {
    let wanted = company.trim().to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.company.to_lowercase() == wanted)
        .collect()
}

/// Records applied on exactly `date`, with their positions.
pub fn select_records_for_date(
    records: &[Application],
    date: NaiveDate,
) -> Vec<(usize, &Application)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.date_applied == date)
        .collect()
}

/// Validate and append a new application, then persist. Returns its position.
pub fn add_record(
    records: &mut Vec<Application>,
    store: &dyn RecordStore,
    new: NewApplication,
) -> Result<usize, TrackerError> {
    let company = new.company.trim();
    if company.is_empty() {
        return Err(TrackerError::EmptyCompany);
    }
    let mut job_links = clean_links(&new.job_links)?;
    if job_links.is_empty() {
        job_links.push(PLACEHOLDER_LINK.to_string());
    }

    records.push(Application {
        company: company.to_string(),
        job_links,
        date_applied: new.date_applied,
        connection_status: new.connection_status,
        application_status: new.application_status,
    });

    if let Err(e) = store.replace_all(records) {
        records.pop();
        return Err(e.into());
    }
    Ok(records.len() - 1)
}

/// Append links and overwrite both statuses of the record at `position`,
/// then persist. Links are not deduplicated.
pub fn update_record(
    records: &mut [Application],
    store: &dyn RecordStore,
    position: usize,
    new_links: &[String],
    connection_status: ConnectionStatus,
    application_status: ApplicationStatus,
) -> Result<(), TrackerError> {
    let len = records.len();
    let new_links = clean_links(new_links)?;
    let record = records
        .get_mut(position)
        .ok_or(TrackerError::PositionOutOfRange { position, len })?;

    let previous = record.clone();
    record.job_links.extend(new_links);
    record.connection_status = connection_status;
    record.application_status = application_status;

    if let Err(e) = store.replace_all(records) {
        records[position] = previous;
        return Err(e.into());
    }
    Ok(())
}

fn clean_links(links: &[String]) -> Result<Vec<String>, TrackerError> {
    links
        .iter()
        .map(|link| link.trim())
        .filter(|link| !link.is_empty())
        .map(|link| {
            if link.contains(LINK_SEPARATOR) {
                Err(TrackerError::InvalidLink(link.to_string()))
            } else {
                Ok(link.to_string())
            }
        })
        .collect()
}
