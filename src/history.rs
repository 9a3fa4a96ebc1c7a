use std::sync::Arc;
use std::time::Duration;

use crate::debounce::Debouncer;
use crate::store::{HistoryEntry, Store};

/// Debounced write path into the store's history, plus direct reads.
pub struct HistoryPersister {
    store: Arc<dyn Store>,
    writes: Debouncer<(String, String), ()>,
}

impl HistoryPersister {
    pub fn new(store: Arc<dyn Store>, delay: Duration) -> Self {
        let sink = store.clone();
        let writes = Debouncer::new(delay, move |(language, text): (String, String)| {
            let sink = sink.clone();
            async move {
                if text.trim().is_empty() {
                    return;
                }
                log::debug!("Saving history entry for {language}");
                if let Err(e) = sink.append(&language, &text) {
                    log::warn!("Failed to save history: {e}");
                }
            }
        });
        Self { store, writes }
    }

    /// Queue `text` for `language`; only the last call in a quiet window lands.
    pub fn record(&self, language: &str, text: &str) {
        // Fire and forget, the write completes on its own timer.
        drop(self.writes.call((language.to_string(), text.to_string())));
    }

    /// Write a still-pending entry now, e.g. before shutdown.
    pub async fn flush(&self) {
        if self.writes.flush().await {
            log::debug!("Flushed pending history entry");
        }
    }

    /// Already-persisted entries for `language`, newest first.
    pub fn read(&self, language: &str) -> Vec<HistoryEntry> {
        self.store.list(language).unwrap_or_else(|e| {
            log::warn!("History unavailable: {e}");
            Vec::new()
        })
    }
}
