//! Type-as-you-go translation core.
//!
//! Keystrokes are coalesced by a trailing-edge debounce, sent as sequenced
//! lookups, and only the newest answer ever reaches the display no matter
//! in which order the lookups complete. Source texts are saved to a
//! per-language history on a second, longer debounce.

pub mod app;
pub mod config;
pub mod debounce;
pub mod history;
pub mod language;
pub mod sequencer;
pub mod store;
pub mod translator;
pub mod transliterate;

pub use app::{Orchestrator, Phase, Snapshot, ViewEvent};
pub use config::Config;
pub use language::{Language, LanguagePair};
pub use store::{HistoryEntry, JsonFileStore, MemoryStore, Store};
pub use translator::{LindatTranslator, Lookup, LookupError};
