use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// A creator whose profile page is monitored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub name: String,
    pub url: String,
}

/// One record of the creator list as written in the file. Fields may be
/// missing or blank; such entries are skipped at run time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatorEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl CreatorEntry {
    pub fn validate(&self) -> Option<Creator> {
        let name = self.name.trim();
        let url = self.url.trim();
        if name.is_empty() || url.is_empty() {
            return None;
        }

        Some(Creator {
            name: name.to_string(),
            url: url.to_string(),
        })
    }
}

pub fn load_creators(path: &Path) -> Result<Vec<CreatorEntry>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<CreatorEntry> =
        serde_json::from_str(&text).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;

    if entries.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }
    if entries.iter().all(|e| e.validate().is_none()) {
        return Err(ConfigError::NoValidCreators(path.to_path_buf()));
    }

    Ok(entries)
}
