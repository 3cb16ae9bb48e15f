use chrono::NaiveDate;

use crate::error::{StoreError, TrackerError};
use crate::models::{Application, ApplicationStatus, ConnectionStatus, NewApplication, RecordSet};
use crate::query;
use crate::store::RecordStore;

/// One user's working session: the chosen medium and the record set loaded
/// from it at open.
pub struct Session {
    store: Box<dyn RecordStore>,
    records: RecordSet,
}

impl Session {
    pub fn open(store: Box<dyn RecordStore>) -> Result<Self, StoreError> {
        let records = store.load()?;
        Ok(Self { store, records })
    }

    pub fn records(&self) -> &[Application] {
        &self.records
    }

    pub fn describe_store(&self) -> String {
        self.store.describe()
    }

    pub fn find_by_company(&self, query: &str) -> Vec<String> {
        query::find_by_company(&self.records, query)
    }

    pub fn for_company(&self, company: &str) -> Vec<(usize, &Application)> {
        query::select_records_for_company(&self.records, company)
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<(usize, &Application)> {
        query::select_records_for_date(&self.records, date)
    }

    pub fn add(&mut self, new: NewApplication) -> Result<usize, TrackerError> {
        query::add_record(&mut self.records, self.store.as_ref(), new)
    }

    pub fn update(
        &mut self,
        position: usize,
        new_links: &[String],
        connection_status: ConnectionStatus,
        application_status: ApplicationStatus,
    ) -> Result<(), TrackerError> {
        query::update_record(
            &mut self.records,
            self.store.as_ref(),
            position,
            new_links,
            connection_status,
            application_status,
        )
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::parse_date;
    use crate::store::fixtures::app;
    use crate::store::memory::MemoryStore;
    use crate::store::{CsvStore, SchemaPolicy};

    #[test]
    fn open_loads_existing_records() {
        let store = MemoryStore::with(vec![app("Acme", "2025-03-01"), app("Globex", "2025-03-02")]);

        let session = Session::open(Box::new(store)).unwrap();

        assert_eq!(session.records().len(), 2);
        assert_eq!(session.find_by_company("glo"), vec!["globex"]);
        assert_eq!(session.describe_store(), "memory");
    }

    #[test]
    fn changes_survive_a_new_session_on_the_same_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apps.csv");
        let open = || Session::open(Box::new(CsvStore::new(&path, SchemaPolicy::Reset))).unwrap();

        let mut session = open();
        assert!(session.records().is_empty());
        let pos = session
            .add(NewApplication {
                company: "Acme".into(),
                job_links: vec!["https://acme.co/1".into()],
                date_applied: parse_date("2025-03-01").unwrap(),
                connection_status: ConnectionStatus::RequestPending,
                application_status: ApplicationStatus::Applied,
            })
            .unwrap();
        session
            .update(
                pos,
                &["https://acme.co/2".to_string()],
                ConnectionStatus::Sent,
                ApplicationStatus::PositiveResponse,
            )
            .unwrap();
        drop(session);

        let session = open();
        let found = session.for_company("ACME");
        assert_eq!(found.len(), 1);
        let (_, record) = found[0];
        assert_eq!(record.job_links, vec!["https://acme.co/1", "https://acme.co/2"]);
        assert_eq!(record.connection_status, ConnectionStatus::Sent);
        assert_eq!(record.application_status, ApplicationStatus::PositiveResponse);
        assert_eq!(session.for_date(parse_date("2025-03-01").unwrap()).len(), 1);
    }
}
