use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::ProjectDirs;

use crate::credentials::BearerCredential;
use crate::store::{CsvStore, RecordStore, SchemaPolicy, SheetsStore};

const CSV_FILE: &str = "job_applications.csv";
const CREDENTIALS_FILE: &str = "credentials.json";
const PROFILE_FILE: &str = "user_config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    Csv,
    Sheets,
}

/// Everything needed to open a record store, resolved from flags and env.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: Backend,
    pub csv_path: Option<PathBuf>,
    pub spreadsheet: String,
    pub credentials_path: Option<PathBuf>,
    pub policy: SchemaPolicy,
}

impl StoreConfig {
    pub fn open_store(&self) -> Result<Box<dyn RecordStore>> {
        match self.backend {
            Backend::Csv => {
                let path = match &self.csv_path {
                    Some(path) => path.clone(),
                    None => default_csv_path(),
                };
                Ok(Box::new(CsvStore::new(path, self.policy)))
            }
            Backend::Sheets => {
                let path = match &self.credentials_path {
                    Some(path) => path.clone(),
                    None => config_file(CREDENTIALS_FILE)?,
                };
                let credential = BearerCredential::from_file(&path)?;
                let missing = credential.missing_scopes();
                if !missing.is_empty() {
                    tracing::warn!(?missing, "credential may lack required scopes");
                }
                let store = SheetsStore::connect(&credential, &self.spreadsheet, self.policy)?;
                Ok(Box::new(store))
            }
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "jobtrack")
}

pub fn default_csv_path() -> PathBuf {
    // XDG data directory, else the current directory
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(CSV_FILE),
        None => PathBuf::from(CSV_FILE),
    }
}

fn config_file(name: &str) -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(name))
        .ok_or_else(|| anyhow!("Could not determine a config directory; pass the path explicitly"))
}

pub fn default_profile_path() -> Result<PathBuf> {
    config_file(PROFILE_FILE)
}
