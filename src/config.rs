use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::language::{Language, LanguagePair};
use crate::translator::LINDAT_URL;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the translation service.
    pub api_url: String,
    pub languages: Vec<Language>,
    /// Language ids of the initial direction.
    pub default_source: String,
    pub default_target: String,
    /// Quiet period before a lookup is sent.
    pub lookup_debounce_ms: u64,
    /// Quiet period before source text is written to history.
    pub history_debounce_ms: u64,
    pub lookup_timeout_ms: u64,
    /// History entries kept per language.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: LINDAT_URL.into(),
            languages: vec![Language::ukrainian(), Language::czech()],
            default_source: "uk".into(),
            default_target: "cs".into(),
            lookup_debounce_ms: 500,
            history_debounce_ms: 10_000,
            lookup_timeout_ms: 30_000,
            history_limit: 100,
        }
    }
}

impl Config {
    /// Directory: ~/.config/live-translate/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("live-translate");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    pub fn exists() -> bool {
        Self::path().exists()
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                log::warn!("Invalid config {}, using defaults: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }

    pub fn language(&self, id: &str) -> Option<&Language> {
        self.languages.iter().find(|l| l.id == id)
    }

    /// The configured initial direction, or uk -> cs if it names unknown ids.
    pub fn default_pair(&self) -> LanguagePair {
        match (self.language(&self.default_source), self.language(&self.default_target)) {
            (Some(source), Some(target)) => LanguagePair::new(source.clone(), target.clone()),
            _ => {
                log::warn!(
                    "Unknown default languages {} -> {}, using built-in pair",
                    self.default_source,
                    self.default_target
                );
                LanguagePair::default()
            }
        }
    }

    pub fn lookup_debounce(&self) -> Duration {
        Duration::from_millis(self.lookup_debounce_ms)
    }

    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}
