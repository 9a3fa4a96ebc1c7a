use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Errors from the durable store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single saved source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub language: String,
    pub text: String,
    pub timestamp: String,
}

impl HistoryEntry {
    fn now(language: &str, text: &str) -> Self {
        Self {
            language: language.to_string(),
            text: text.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Key-value defaults plus an append-only per-language history log.
///
/// No transactions: the last write wins.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn append(&self, language: &str, text: &str) -> Result<(), StoreError>;

    /// History for `language`, newest first.
    fn list(&self, language: &str) -> Result<Vec<HistoryEntry>, StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    defaults: BTreeMap<String, String>,
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

impl StoreData {
    /// Returns false when the entry duplicates the newest one for its language.
    fn push(&mut self, language: &str, text: &str, limit: usize) -> bool {
        let newest = self.history.iter().rev().find(|e| e.language == language);
        if newest.is_some_and(|e| e.text == text) {
            return false;
        }
        self.history.push(HistoryEntry::now(language, text));

        let count = self.history.iter().filter(|e| e.language == language).count();
        let mut excess = count.saturating_sub(limit);
        self.history.retain(|e| {
            if excess > 0 && e.language == language {
                excess -= 1;
                false
            } else {
                true
            }
        });
        true
    }

    fn list(&self, language: &str) -> Vec<HistoryEntry> {
        self.history
            .iter()
            .rev()
            .filter(|e| e.language == language)
            .cloned()
            .collect()
    }
}

fn lock(data: &Mutex<StoreData>) -> MutexGuard<'_, StoreData> {
    data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Store backed by one JSON document, rewritten on every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    limit: usize,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Directory: ~/.local/share/live-translate/
    fn dir() -> PathBuf {
        let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("live-translate");
        p
    }

    /// Open the store in the user data directory.
    pub fn open_default(limit: usize) -> Self {
        Self::open(Self::dir().join("store.json"), limit)
    }

    /// Load from `path`, starting empty if the file is missing or invalid.
    pub fn open(path: impl Into<PathBuf>, limit: usize) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable store {}: {e}", path.display());
                StoreData::default()
            }),
            Err(_) => StoreData::default(),
        };
        Self {
            path,
            limit,
            data: Mutex::new(data),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, data: &StoreData) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.data).defaults.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut data = lock(&self.data);
        data.defaults.insert(key.to_string(), value.to_string());
        self.save(&data)
    }

    fn append(&self, language: &str, text: &str) -> Result<(), StoreError> {
        let mut data = lock(&self.data);
        if data.push(language, text, self.limit) {
            self.save(&data)?;
        }
        Ok(())
    }

    fn list(&self, language: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(lock(&self.data).list(language))
    }
}

/// In-process store for ephemeral sessions.
pub struct MemoryStore {
    limit: usize,
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            data: Mutex::new(StoreData::default()),
        }
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.data).defaults.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.data)
            .defaults
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn append(&self, language: &str, text: &str) -> Result<(), StoreError> {
        lock(&self.data).push(language, text, self.limit);
        Ok(())
    }

    fn list(&self, language: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(lock(&self.data).list(language))
    }
}
