//! Recent searches, newest first, persisted on every change.

use anyhow::{Context, Result};
use chrono::Utc;
use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::sync::watch;

use crate::model::{RecentSearchEntry, SearchRequest};

pub const RECENT_SEARCHES_KEY: &str = "weather-dashboard:recent-searches";
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Durable string storage addressed by key.
pub trait Storage: Send + Sync + Debug {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as a JSON file in one directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(contents))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// In-process storage, used when history should not outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("memory storage lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Capacity-bounded list of past searches.
///
/// `add` is the only mutator; readers take snapshots or subscribe.
#[derive(Debug)]
pub struct RecentSearchStore {
    storage: Arc<dyn Storage>,
    entries: watch::Sender<Vec<RecentSearchEntry>>,
}

impl RecentSearchStore {
    /// Load persisted entries. Missing, unreadable or corrupt data yields an empty list.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut entries = match storage.read(RECENT_SEARCHES_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<RecentSearchEntry>>(&raw).unwrap_or_else(|err| {
                tracing::debug!("ignoring corrupt recent searches: {err}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::debug!("recent searches unavailable: {err:#}");
                Vec::new()
            }
        };
        entries.truncate(MAX_RECENT_SEARCHES);

        let (entries, _) = watch::channel(entries);
        Self { storage, entries }
    }

    pub fn entries(&self) -> Vec<RecentSearchEntry> {
        self.entries.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<RecentSearchEntry>> {
        self.entries.subscribe()
    }

    /// Record `params` as the newest search and persist the list.
    pub fn add(&self, params: SearchRequest) {
        let entry = RecentSearchEntry {
            params,
            timestamp: Utc::now(),
        };

        self.entries.send_modify(|entries| {
            entries.insert(0, entry);
            entries.truncate(MAX_RECENT_SEARCHES);
        });

        if let Err(err) = self.persist() {
            tracing::warn!("Unable to persist recent searches: {err:#}");
        }
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&*self.entries.borrow())
            .context("Failed to serialize recent searches")?;
        self.storage.write(RECENT_SEARCHES_KEY, &json)
    }
}
