use crate::translator::{LookupFailure, LookupRequest, LookupResponse};

/// What the orchestrator should do with one completed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The answered request was the latest dispatched; the busy flag dropped.
    pub settled: bool,
    /// Translation to display, or `None` when the response was stale.
    pub apply: Option<String>,
}

/// Orders lookups that may complete in any order.
///
/// Two counters answer two separate questions: `dispatched` decides whether
/// the latest request is still outstanding (busy indicator), `applied`
/// decides whether a response is newer than anything shown so far.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    dispatched: u64,
    applied: u64,
    loading: bool,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new request with the next sequence id and mark busy.
    pub fn dispatch(&mut self, text: &str, from: &str, to: &str) -> LookupRequest {
        self.dispatched += 1;
        self.loading = true;
        LookupRequest {
            text: text.to_string(),
            from_language: from.to_string(),
            to_language: to.to_string(),
            sequence_id: self.dispatched,
        }
    }

    pub fn on_response(&mut self, response: LookupResponse) -> Resolution {
        let settled = self.is_latest(response.sequence_id);
        if settled {
            self.loading = false;
        }

        let apply = if response.sequence_id > self.applied {
            self.applied = response.sequence_id;
            Some(response.text)
        } else {
            log::debug!(
                "Discarding stale response #{} (applied #{})",
                response.sequence_id,
                self.applied
            );
            None
        };

        Resolution { settled, apply }
    }

    /// A failed lookup only drops the busy flag; nothing is applied.
    pub fn on_failure(&mut self, failure: &LookupFailure) {
        log::warn!("Lookup #{} failed: {}", failure.sequence_id, failure.error);
        self.loading = false;
    }

    pub fn is_latest(&self, sequence_id: u64) -> bool {
        sequence_id == self.dispatched
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }
}
