use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Identity fields used when drafting outreach messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub linkedin_url: String,
    pub portfolio_url: String,
    pub position: String,
}

impl UserProfile {
    /// A missing file is an empty profile.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("Invalid profile file: {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read profile: {}", path.display())),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write profile: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_profile_is_default() {
        let dir = TempDir::new().unwrap();
        let profile = UserProfile::load(&dir.path().join("user_config.json")).unwrap();
        assert_eq!(profile, UserProfile::default());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config/user_config.json");
        let profile = UserProfile {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            linkedin_url: "https://linkedin.com/in/ada".into(),
            portfolio_url: String::new(),
            position: "Software Engineer Intern".into(),
        };

        profile.save(&path).unwrap();

        assert_eq!(UserProfile::load(&path).unwrap(), profile);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_config.json");
        fs::write(&path, r#"{"name": "Ada"}"#).unwrap();

        let profile = UserProfile::load(&path).unwrap();

        assert_eq!(profile.name, "Ada");
        assert!(profile.email.is_empty());
    }
}
