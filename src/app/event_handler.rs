use std::sync::Mutex;

use super::state::{emit, lock, Session, ViewEvent};
use crate::translator::LookupOutcome;

/// Fold one completed lookup into the session. This is where races resolve.
pub fn handle_lookup_outcome(
    session: &Mutex<Session>,
    events: &async_channel::Sender<ViewEvent>,
    outcome: LookupOutcome,
) {
    let mut s = lock(session);
    let was_loading = s.sequencer.loading();

    match outcome {
        Ok(response) => {
            let id = response.sequence_id;
            let resolution = s.sequencer.on_response(response);
            if let Some(text) = resolution.apply {
                log::debug!("Applying response #{id}");
                s.translation = text.trim().to_string();
                emit(
                    events,
                    ViewEvent::TranslationChanged {
                        text: s.translation.clone(),
                        transliteration: s.transliteration(),
                    },
                );
            }
        }
        // Prior translation stays on screen.
        Err(failure) => s.sequencer.on_failure(&failure),
    }

    if was_loading && !s.sequencer.loading() {
        emit(events, ViewEvent::LoadingChanged(false));
    }
}
