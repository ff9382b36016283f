//! The two JSON files carried from one run to the next: the log of item
//! links already posted, and the list of creators waiting for a manual look.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Creator;
use crate::error::StateError;

/// Reads `path` as JSON, or returns `fallback` if the file is missing or
/// can't be parsed.
pub fn load<T: DeserializeOwned>(path: &Path, fallback: T) -> T {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "state file not found, starting empty");
            return fallback;
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "can't read state file, starting empty");
            return fallback;
        }
    };

    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "corrupt state file, starting empty");
            fallback
        }
    }
}

/// Writes `value` as pretty JSON. The data goes to a sibling temp file first
/// and is renamed over `path`.
pub fn save<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StateError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|source| StateError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    text.push('\n');

    let io_err = |source: std::io::Error| StateError::Io {
        path: path.to_path_buf(),
        source,
    };

    let tmp = tmp_path(path);
    fs::write(&tmp, text).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Links of items already posted to the webhook, in the order they were sent.
#[derive(Debug)]
pub struct NotifiedLog {
    path: PathBuf,
    links: Vec<String>,
    seen: HashSet<String>,
}

impl NotifiedLog {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored: Vec<String> = load(&path, Vec::new());

        let mut log = Self {
            path,
            links: Vec::with_capacity(stored.len()),
            seen: HashSet::with_capacity(stored.len()),
        };
        for link in stored {
            log.insert(link);
        }
        log
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    /// Returns false if the link was already present.
    pub fn insert(&mut self, link: String) -> bool {
        if !self.seen.insert(link.clone()) {
            return false;
        }
        self.links.push(link);
        true
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn persist(&self) -> Result<(), StateError> {
        save(&self.path, &self.links)
    }
}

/// Why a creator was put on the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewReason {
    #[serde(rename = "network error")]
    NetworkError,
    #[serde(rename = "redirect")]
    Redirect,
    #[serde(rename = "http error")]
    HttpError,
    #[serde(rename = "parse error")]
    ParseError,
}

impl ReviewReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network error",
            Self::Redirect => "redirect",
            Self::HttpError => "http error",
            Self::ParseError => "parse error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub reason: ReviewReason,
    pub when: DateTime<Utc>,
}

impl ReviewEntry {
    pub fn new(creator: &Creator, status: Option<u16>, reason: ReviewReason) -> Self {
        Self {
            name: creator.name.clone(),
            url: creator.url.clone(),
            status,
            reason,
            when: Utc::now(),
        }
    }
}

/// Creators whose pages need a manual look. Any url on the list when it is
/// loaded is skipped for the whole run, until someone removes the entry
/// from the file.
#[derive(Debug)]
pub struct ReviewList {
    path: PathBuf,
    entries: Vec<ReviewEntry>,
    flagged: HashSet<String>,
}

impl ReviewList {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries: Vec<ReviewEntry> = load(&path, Vec::new());
        let flagged = entries.iter().map(|e| e.url.clone()).collect();
        Self {
            path,
            entries,
            flagged,
        }
    }

    /// Whether the url was already flagged when the list was loaded.
    /// Entries pushed during the run don't count.
    pub fn is_flagged(&self, url: &str) -> bool {
        self.flagged.contains(url)
    }

    pub fn push(&mut self, entry: ReviewEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReviewEntry] {
        &self.entries
    }

    /// Keeps the first entry seen for each url.
    pub fn dedup_by_url(&mut self) {
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert(e.url.clone()));
    }

    pub fn persist(&self) -> Result<(), StateError> {
        save(&self.path, &self.entries)
    }
}
