use std::sync::{Mutex, MutexGuard};

use crate::language::{LanguagePair, LanguagePairState};
use crate::sequencer::RequestSequencer;

/// Notifications for whatever renders the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SourceChanged(String),
    LanguagesChanged(LanguagePair),
    LoadingChanged(bool),
    TranslationChanged {
        text: String,
        transliteration: String,
    },
}

/// Busy indicator for the displayed result (not per request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

/// Everything one orchestrator instance owns. Never shared between instances.
pub struct Session {
    pub source: String,
    pub languages: LanguagePairState,
    pub translation: String,
    pub sequencer: RequestSequencer,
}

impl Session {
    pub fn new(languages: LanguagePairState) -> Self {
        Self {
            source: String::new(),
            languages,
            translation: String::new(),
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.sequencer.loading() {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }

    /// Phonetic rendering of the translation in the current target script.
    pub fn transliteration(&self) -> String {
        self.languages.pair().target.transliterate(&self.translation)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            source: self.source.clone(),
            pair: self.languages.pair().clone(),
            translation: self.translation.clone(),
            transliteration: self.transliteration(),
            phase: self.phase(),
            dispatched: self.sequencer.dispatched(),
            applied: self.sequencer.applied(),
        }
    }
}

/// Read-only copy of the observable orchestrator state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub source: String,
    pub pair: LanguagePair,
    pub translation: String,
    pub transliteration: String,
    pub phase: Phase,
    pub dispatched: u64,
    pub applied: u64,
}

impl Snapshot {
    pub fn loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}

pub fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Push an event to the view; a closed view is not an error.
pub fn emit(events: &async_channel::Sender<ViewEvent>, event: ViewEvent) {
    if events.try_send(event).is_err() {
        log::trace!("View channel closed, dropping event");
    }
}
