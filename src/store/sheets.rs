use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    check_foreign_header, decode_rows, encode_rows, header_row, numbered, Decoded, RecordStore,
    SchemaPolicy,
};
use crate::credentials::BearerCredential;
use crate::error::StoreError;
use crate::models::{Application, RecordSet};

const GOOGLE_SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const GOOGLE_DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

pub const DEFAULT_SPREADSHEET: &str = "job-tracker";

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spreadsheet {
    spreadsheet_id: String,
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: u32,
}

#[derive(Debug, Serialize)]
struct CreateSpreadsheet<'a> {
    properties: CreateProperties<'a>,
}

#[derive(Debug, Serialize)]
struct CreateProperties<'a> {
    title: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<String>>,
}

// --- Store ---

/// Base URLs of the spreadsheet and file-listing services.
#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    pub sheets: String,
    pub drive_files: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            sheets: GOOGLE_SHEETS_URL.to_string(),
            drive_files: GOOGLE_DRIVE_FILES_URL.to_string(),
        }
    }
}

/// Record set kept in the first worksheet of a hosted spreadsheet.
pub struct SheetsStore {
    client: Client,
    endpoints: Endpoints,
    token: String,
    name: String,
    spreadsheet_id: String,
    sheet_title: String,
    policy: SchemaPolicy,
}

impl SheetsStore {
    /// Open the spreadsheet called `name`, creating it if it does not exist.
    pub fn connect(
        credential: &BearerCredential,
        name: &str,
        policy: SchemaPolicy,
    ) -> Result<Self, StoreError> {
        Self::connect_with(Endpoints::default(), &credential.token, name, policy)
    }

    pub(crate) fn connect_with(
        endpoints: Endpoints,
        token: &str,
        name: &str,
        policy: SchemaPolicy,
    ) -> Result<Self, StoreError> {
        let client = Client::new();

        let spreadsheet = match find_spreadsheet(&client, &endpoints, token, name)? {
            Some(id) => get_spreadsheet(&client, &endpoints, token, &id)?,
            None => create_spreadsheet(&client, &endpoints, token, name)?,
        };
        let sheet_title = first_sheet_title(&spreadsheet).unwrap_or_else(|| "Sheet1".to_string());
        debug!(
            spreadsheet = %spreadsheet.spreadsheet_id,
            sheet = %sheet_title,
            "using worksheet"
        );

        Ok(Self {
            client,
            endpoints,
            token: token.to_string(),
            name: name.to_string(),
            spreadsheet_id: spreadsheet.spreadsheet_id,
            sheet_title,
            policy,
        })
    }

    fn values_url(&self, suffix: &str) -> Result<Url, StoreError> {
        values_url(
            &self.endpoints.sheets,
            &self.spreadsheet_id,
            &self.sheet_title,
            suffix,
        )
    }

    fn clear(&self) -> Result<(), StoreError> {
        let url = self.values_url(":clear")?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({}))
            .send()?;
        check(response)?;
        Ok(())
    }

    fn append(&self, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        let mut url = self.values_url(":append")?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueRange {
            range: Some(sheet_range(&self.sheet_title)),
            major_dimension: Some("ROWS".to_string()),
            values: rows,
        };
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        check(response)?;
        Ok(())
    }

    fn write_rows(&self, rows: Vec<Vec<String>>) -> Result<(), StoreError> {
        self.clear()?;
        self.append(rows)
    }
}

impl RecordStore for SheetsStore {
    fn load(&self) -> Result<RecordSet, StoreError> {
        let url = self.values_url("")?;
        let response = self.client.get(url).bearer_auth(&self.token).send()?;
        let values: ValueRange = check(response)?.json()?;

        match decode_rows(numbered(values.values))? {
            Decoded::Empty => Ok(Vec::new()),
            Decoded::Records(records) => {
                debug!(sheet = %self.name, count = records.len(), "loaded applications");
                Ok(records)
            }
            Decoded::ForeignHeader(header) => {
                check_foreign_header(self.policy, &self.describe(), &header)?;
                self.write_rows(vec![header_row()])?;
                Ok(Vec::new())
            }
        }
    }

    fn replace_all(&self, records: &[Application]) -> Result<(), StoreError> {
        self.write_rows(encode_rows(records))?;
        debug!(sheet = %self.name, count = records.len(), "rewrote worksheet");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("spreadsheet '{}' ({})", self.name, self.sheet_title)
    }
}

// --- Requests ---

/// Map a non-success response to an error carrying the service's message.
///
/// Only 401 means the credential itself is bad. A 403 (missing scope,
/// sharing, disabled API) keeps its status and body as an `Api` error.
fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        let message = response.text().unwrap_or_default();
        return Err(StoreError::Unauthorized { message });
    }
    if !status.is_success() {
        let message = response.text().unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

fn find_spreadsheet(
    client: &Client,
    endpoints: &Endpoints,
    token: &str,
    name: &str,
) -> Result<Option<String>, StoreError> {
    let response = client
        .get(&endpoints.drive_files)
        .bearer_auth(token)
        .query(&[
            ("q", drive_query(name).as_str()),
            ("fields", "files(id)"),
            ("pageSize", "1"),
        ])
        .send()?;
    let list: FileList = check(response)?.json()?;
    Ok(list.files.into_iter().next().map(|f| f.id))
}

fn get_spreadsheet(
    client: &Client,
    endpoints: &Endpoints,
    token: &str,
    id: &str,
) -> Result<Spreadsheet, StoreError> {
    let response = client
        .get(format!("{}/{id}", endpoints.sheets))
        .bearer_auth(token)
        .query(&[("fields", "spreadsheetId,sheets.properties(title,index)")])
        .send()?;
    Ok(check(response)?.json()?)
}

fn create_spreadsheet(
    client: &Client,
    endpoints: &Endpoints,
    token: &str,
    name: &str,
) -> Result<Spreadsheet, StoreError> {
    let response = client
        .post(&endpoints.sheets)
        .bearer_auth(token)
        .json(&CreateSpreadsheet {
            properties: CreateProperties { title: name },
        })
        .send()?;
    let spreadsheet: Spreadsheet = check(response)?.json()?;
    info!(name, id = %spreadsheet.spreadsheet_id, "created spreadsheet");
    Ok(spreadsheet)
}

// --- Helpers ---

fn drive_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

fn first_sheet_title(spreadsheet: &Spreadsheet) -> Option<String> {
    spreadsheet
        .sheets
        .iter()
        .min_by_key(|s| s.properties.index)
        .map(|s| s.properties.title.clone())
}

/// A1 range covering a whole worksheet.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn values_url(
    base: &str,
    spreadsheet_id: &str,
    sheet_title: &str,
    suffix: &str,
) -> Result<Url, StoreError> {
    let mut url = Url::parse(base).map_err(|e| StoreError::Api {
        status: 0,
        message: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| StoreError::Api {
            status: 0,
            message: "spreadsheet API URL cannot take a path".to_string(),
        })?
        .push(spreadsheet_id)
        .push("values")
        .push(&format!("{}{}", sheet_range(sheet_title), suffix));
    Ok(url)
}
