//! Media library configuration and its on-disk list.

use crate::error::{DavPlayError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// A configured WebDAV media library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLibrary {
    /// Display name, also the keyring key suffix.
    pub name: String,
    /// Base URL of the library, e.g. `https://nas.local/dav/`.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Never written to the library file.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    /// Parse PROPFIND responses strictly.
    #[serde(default)]
    pub webdav_strict: bool,
}

impl MediaLibrary {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            account: None,
            password: None,
            webdav_strict: false,
        }
    }

    pub fn with_credentials(
        mut self,
        account: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.account = Some(account.into());
        self.password = Some(password.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.webdav_strict = strict;
        self
    }

    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.url).map_err(|e| DavPlayError::invalid_url(&self.url, e))
    }

    /// Account and password, only when both are non-empty.
    pub fn account_info(&self) -> Option<(&str, &str)> {
        match (self.account.as_deref(), self.password.as_deref()) {
            (Some(account), Some(password)) if !account.is_empty() && !password.is_empty() => {
                Some((account, password))
            }
            _ => None,
        }
    }

    pub fn has_account(&self) -> bool {
        self.account.as_deref().is_some_and(|a| !a.is_empty())
    }
}

/// JSON file holding every configured library.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LibraryFile {
    #[serde(skip)]
    path: PathBuf,
    #[serde(default)]
    pub libraries: Vec<MediaLibrary>,
}

impl LibraryFile {
    /// Load the file at `path`, or an empty list if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Library file {} not found, starting empty", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                libraries: Vec::new(),
            });
        }

        let raw = fs::read_to_string(path)?;
        let mut file: LibraryFile = serde_json::from_str(&raw)?;
        file.path = path.to_path_buf();
        Ok(file)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MediaLibrary> {
        self.libraries.iter().find(|l| l.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MediaLibrary> {
        self.libraries.iter_mut().find(|l| l.name == name)
    }

    /// Insert or replace the library with the same name.
    pub fn upsert(&mut self, library: MediaLibrary) {
        match self.get_mut(&library.name) {
            Some(existing) => *existing = library,
            None => self.libraries.push(library),
        }
    }

    /// Drop the library named `name`, returning it if it existed.
    pub fn remove(&mut self, name: &str) -> Option<MediaLibrary> {
        let index = self.libraries.iter().position(|l| l.name == name)?;
        Some(self.libraries.remove(index))
    }
}
