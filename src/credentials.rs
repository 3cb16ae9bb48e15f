use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Scopes the spreadsheet medium needs: read/write sheets and create one.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];

/// Authorized-user credential as written by the external OAuth flow.
///
/// Only `token` is presented to the spreadsheet service; the refresh fields
/// are carried so the file round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BearerCredential {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl BearerCredential {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        let credential: BearerCredential = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid credentials file: {}", path.display()))?;
        if credential.token.trim().is_empty() {
            return Err(anyhow!("Credentials file {} has no access token", path.display()));
        }
        Ok(credential)
    }

    /// Scopes the medium needs that the credential was not granted.
    /// An empty grant list is treated as unknown rather than missing.
    pub fn missing_scopes(&self) -> Vec<&'static str> {
        if self.scopes.is_empty() {
            return Vec::new();
        }
        SCOPES
            .into_iter()
            .filter(|scope| !self.scopes.iter().any(|granted| granted == scope))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_authorized_user_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(
            &path,
            r#"{
                "token": "ya29.abc",
                "refresh_token": "1//r",
                "token_uri": "https://oauth2.googleapis.com/token",
                "client_id": "id.apps.googleusercontent.com",
                "client_secret": "s",
                "scopes": ["https://www.googleapis.com/auth/spreadsheets"]
            }"#,
        )
        .unwrap();

        let credential = BearerCredential::from_file(&path).unwrap();

        assert_eq!(credential.token, "ya29.abc");
        assert_eq!(
            credential.missing_scopes(),
            vec!["https://www.googleapis.com/auth/drive.file"]
        );
    }

    #[test]
    fn blank_token_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"token": "  "}"#).unwrap();

        assert!(BearerCredential::from_file(&path).is_err());
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = BearerCredential::from_file(Path::new("/nonexistent/creds.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/creds.json"));
    }
}
