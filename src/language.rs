use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::store::Store;
use crate::transliterate::{transliterate, Transliteration};

/// Store key holding the id of the last chosen source language.
pub const DEFAULT_SOURCE_KEY: &str = "lastTranslationSource";

/// A language the translator can work with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    /// Backend language code, e.g. "uk".
    pub id: String,
    /// Label shown above the text field.
    pub name: String,
    /// Rendering for the phonetic line when this is the target language.
    #[serde(default)]
    pub transliteration: Option<Transliteration>,
}

impl Language {
    pub fn ukrainian() -> Self {
        Self {
            id: "uk".into(),
            name: "Українською".into(),
            transliteration: Some(Transliteration::CyrillicToLatin),
        }
    }

    pub fn czech() -> Self {
        Self {
            id: "cs".into(),
            name: "Česky".into(),
            transliteration: Some(Transliteration::LatinToCyrillic),
        }
    }

    pub fn transliterate(&self, text: &str) -> String {
        transliterate(self.transliteration, text)
    }
}

/// The active translation direction. Always fully populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }

    pub fn flip(&mut self) {
        std::mem::swap(&mut self.source, &mut self.target);
    }

    pub fn flipped(&self) -> Self {
        Self::new(self.target.clone(), self.source.clone())
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new(Language::ukrainian(), Language::czech())
    }
}

/// Current direction plus the durable default it is restored from.
pub struct LanguagePairState {
    pair: LanguagePair,
    store: Arc<dyn Store>,
}

impl LanguagePairState {
    /// Restore the direction chosen in a previous session.
    ///
    /// `fallback` is used as-is unless the stored source id names its target,
    /// in which case the flipped pair is used. An unreadable store counts as
    /// "no default".
    pub fn restore(store: Arc<dyn Store>, fallback: LanguagePair) -> Self {
        let stored = match store.get(DEFAULT_SOURCE_KEY) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Default language unavailable, using fallback: {e}");
                None
            }
        };

        let pair = match stored {
            Some(id) if id == fallback.target.id => fallback.flipped(),
            _ => fallback,
        };
        log::debug!("Restored language pair {} -> {}", pair.source.id, pair.target.id);

        Self { pair, store }
    }

    pub fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    /// Swap source and target and remember the new source for next session.
    pub fn flip(&mut self) -> &LanguagePair {
        self.pair.flip();
        if let Err(e) = self.store.set(DEFAULT_SOURCE_KEY, &self.pair.source.id) {
            log::warn!("Failed to save default language: {e}");
        }
        &self.pair
    }
}
