use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::event_handler::handle_lookup_outcome;
use super::state::{Session, ViewEvent};
use crate::debounce::Debouncer;
use crate::translator::{resolve, Lookup, LookupOutcome, LookupRequest};

pub type LookupScheduler = Debouncer<LookupRequest, LookupOutcome>;

/// Debounced, time-limited path from a stamped request to the backend.
pub fn lookup_scheduler(lookup: Arc<dyn Lookup>, delay: Duration, timeout: Duration) -> LookupScheduler {
    Debouncer::new(delay, move |request: LookupRequest| {
        let lookup = lookup.clone();
        async move {
            log::debug!(
                "Sending lookup #{} ({} -> {})",
                request.sequence_id,
                request.from_language,
                request.to_language
            );
            resolve(lookup.as_ref(), request, timeout).await
        }
    })
}

/// Queue `request` on the scheduler and route its outcome back into the session.
pub fn dispatch_lookup(
    session: &Arc<Mutex<Session>>,
    events: &async_channel::Sender<ViewEvent>,
    scheduler: &LookupScheduler,
    request: LookupRequest,
) {
    let pending = scheduler.call(request);
    let session = session.clone();
    let events = events.clone();

    tokio::spawn(async move {
        if let Some(outcome) = pending.await {
            handle_lookup_outcome(&session, &events, outcome);
        }
    });
}
