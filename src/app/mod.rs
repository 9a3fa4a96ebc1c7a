mod event_handler;
mod pipeline;
mod state;

use std::sync::{Arc, Mutex};

pub use state::{Phase, Snapshot, ViewEvent};

use crate::config::Config;
use crate::history::HistoryPersister;
use crate::language::LanguagePairState;
use crate::store::{HistoryEntry, Store};
use crate::translator::Lookup;
use pipeline::{dispatch_lookup, lookup_scheduler, LookupScheduler};
use state::{emit, lock, Session};

/// Turns text-change and flip events into debounced, sequenced lookups.
///
/// Each instance owns its own counters; create one per session.
/// Must be driven from within a tokio runtime.
pub struct Orchestrator {
    session: Arc<Mutex<Session>>,
    lookups: LookupScheduler,
    history: HistoryPersister,
    events: async_channel::Sender<ViewEvent>,
}

impl Orchestrator {
    pub fn new(
        config: &Config,
        lookup: Arc<dyn Lookup>,
        store: Arc<dyn Store>,
        events: async_channel::Sender<ViewEvent>,
    ) -> Self {
        let languages = LanguagePairState::restore(store.clone(), config.default_pair());
        let pair = languages.pair().clone();
        log::info!("Translating {} -> {}", pair.source.id, pair.target.id);
        emit(&events, ViewEvent::LanguagesChanged(pair));

        Self {
            session: Arc::new(Mutex::new(Session::new(languages))),
            lookups: lookup_scheduler(lookup, config.lookup_debounce(), config.lookup_timeout()),
            history: HistoryPersister::new(store, config.history_debounce()),
            events,
        }
    }

    pub fn on_text_changed(&self, text: &str) {
        self.submit(text, None);
    }

    /// Dispatch `text` in the current direction. History is recorded under
    /// `typed_in` when given, otherwise under the current source language.
    fn submit(&self, text: &str, typed_in: Option<String>) {
        let (language, request, started) = {
            let mut s = lock(&self.session);
            s.source = text.to_string();
            let was_loading = s.sequencer.loading();
            let from = s.languages.pair().source.id.clone();
            let to = s.languages.pair().target.id.clone();
            let request = s.sequencer.dispatch(text, &from, &to);
            (typed_in.unwrap_or(from), request, !was_loading)
        };

        emit(&self.events, ViewEvent::SourceChanged(text.to_string()));
        if started {
            emit(&self.events, ViewEvent::LoadingChanged(true));
        }

        self.history.record(&language, text);
        log::debug!("Queued lookup #{}", request.sequence_id);
        dispatch_lookup(&self.session, &self.events, &self.lookups, request);
    }

    /// Swap the direction and re-translate the current source text.
    pub fn on_flip(&self) {
        let (pair, text, typed_in) = {
            let mut s = lock(&self.session);
            let typed_in = s.languages.pair().source.id.clone();
            let pair = s.languages.flip().clone();
            s.translation.clear();
            (pair, s.source.clone(), typed_in)
        };
        log::info!("Flipped to {} -> {}", pair.source.id, pair.target.id);

        emit(&self.events, ViewEvent::LanguagesChanged(pair));
        emit(
            &self.events,
            ViewEvent::TranslationChanged {
                text: String::new(),
                transliteration: String::new(),
            },
        );
        // The text was typed in the old source language; keep its history there.
        self.submit(&text, Some(typed_in));
    }

    pub fn on_clear(&self) {
        self.on_text_changed("");
    }

    /// Re-enter a history entry as if it had been typed.
    pub fn on_history_selected(&self, text: &str) {
        self.on_text_changed(text);
    }

    /// Saved source texts for the current source language, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let language = lock(&self.session).languages.pair().source.id.clone();
        self.history.read(&language)
    }

    pub fn snapshot(&self) -> Snapshot {
        lock(&self.session).snapshot()
    }

    /// Persist any history entry still waiting out its debounce.
    pub async fn shutdown(&self) {
        self.history.flush().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::{Language, DEFAULT_SOURCE_KEY};
    use crate::store::MemoryStore;
    use crate::translator::LookupError;
    use futures_util::future::BoxFuture;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;
    use tokio::time::sleep;

    /// Backend answering "{to}:{text}" after a per-text delay.
    #[derive(Default)]
    struct Scripted {
        calls: Mutex<Vec<(String, String, String)>>,
        delays: Mutex<HashMap<String, Duration>>,
        failing: Mutex<HashSet<String>>,
    }

    impl Scripted {
        fn delay(&self, text: &str, delay: Duration) {
            self.delays.lock().unwrap().insert(text.into(), delay);
        }

        fn fail(&self, text: &str) {
            self.failing.lock().unwrap().insert(text.into());
        }

        fn calls(&self) -> Vec<(String, String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Lookup for Scripted {
        fn lookup(&self, text: &str, from: &str, to: &str)
            -> BoxFuture<'static, Result<String, LookupError>> {
            self.calls
                .lock()
                .unwrap()
                .push((text.into(), from.into(), to.into()));
            let delay = self
                .delays
                .lock()
                .unwrap()
                .get(text)
                .copied()
                .unwrap_or(Duration::from_millis(50));
            let answer = if self.failing.lock().unwrap().contains(text) {
                Err(LookupError::Transport("connection reset".into()))
            } else if text.is_empty() {
                Ok(String::new())
            } else {
                Ok(format!("{to}:{text}"))
            };
            Box::pin(async move {
                sleep(delay).await;
                answer
            })
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        backend: Arc<Scripted>,
        store: Arc<MemoryStore>,
        events: async_channel::Receiver<ViewEvent>,
    }

    fn harness_with(store: Arc<MemoryStore>) -> Harness {
        let backend = Arc::new(Scripted::default());
        let (tx, rx) = async_channel::unbounded();
        let orchestrator = Orchestrator::new(&Config::default(), backend.clone(), store.clone(), tx);
        Harness {
            orchestrator,
            backend,
            store,
            events: rx,
        }
    }

    fn harness() -> Harness {
        harness_with(Arc::new(MemoryStore::new(100)))
    }

    fn drain(events: &async_channel::Receiver<ViewEvent>) -> Vec<ViewEvent> {
        std::iter::from_fn(|| events.try_recv().ok()).collect()
    }

    fn call(text: &str, from: &str, to: &str) -> (String, String, String) {
        (text.into(), from.into(), to.into())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_sends_one_lookup_with_last_text() {
        let h = harness();
        h.orchestrator.on_text_changed("H");
        sleep(Duration::from_millis(100)).await;
        h.orchestrator.on_text_changed("Hi");
        sleep(Duration::from_millis(100)).await;
        h.orchestrator.on_text_changed("Hi t");
        assert!(h.orchestrator.snapshot().loading());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(h.backend.calls(), [call("Hi t", "uk", "cs")]);

        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.translation, "cs:Hi t");
        assert_eq!(snap.transliteration, Language::czech().transliterate("cs:Hi t"));
        assert_eq!((snap.dispatched, snap.applied), (3, 3));
        assert_eq!(snap.phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_early_response_never_clobbers_newer_one() {
        let h = harness();
        h.backend.delay("Hi", Duration::from_secs(5));
        h.backend.delay("Hi t", Duration::from_millis(100));

        h.orchestrator.on_text_changed("Hi");
        sleep(Duration::from_millis(600)).await;
        h.orchestrator.on_text_changed("Hi t");

        sleep(Duration::from_secs(1)).await;
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.translation, "cs:Hi t");
        assert_eq!(snap.applied, 2);
        assert!(!snap.loading());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(h.backend.calls().len(), 2);
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.translation, "cs:Hi t");
        assert_eq!(snap.applied, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn early_answer_shows_while_latest_is_outstanding() {
        let h = harness();
        h.backend.delay("a", Duration::from_millis(100));
        h.backend.delay("ab", Duration::from_secs(5));

        h.orchestrator.on_text_changed("a");
        sleep(Duration::from_millis(550)).await;
        h.orchestrator.on_text_changed("ab");

        sleep(Duration::from_millis(200)).await;
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.translation, "cs:a");
        assert!(snap.loading(), "latest request is still outstanding");

        sleep(Duration::from_secs(6)).await;
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.translation, "cs:ab");
        assert!(!snap.loading());
    }

    #[tokio::test(start_paused = true)]
    async fn flip_swaps_direction_and_retranslates_source() {
        let h = harness();
        h.orchestrator.on_text_changed("Привіт");
        sleep(Duration::from_secs(1)).await;
        assert_eq!(h.orchestrator.snapshot().translation, "cs:Привіт");

        h.orchestrator.on_flip();
        let snap = h.orchestrator.snapshot();
        assert_eq!((snap.pair.source.id.as_str(), snap.pair.target.id.as_str()), ("cs", "uk"));
        assert_eq!(snap.translation, "");
        assert_eq!(snap.source, "Привіт");
        assert!(snap.loading());
        assert_eq!(h.store.get(DEFAULT_SOURCE_KEY).unwrap().as_deref(), Some("cs"));

        sleep(Duration::from_secs(1)).await;
        assert_eq!(h.backend.calls().last(), Some(&call("Привіт", "cs", "uk")));
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.translation, "uk:Привіт");
        assert_eq!(snap.transliteration, Language::ukrainian().transliterate("uk:Привіт"));
    }

    #[tokio::test(start_paused = true)]
    async fn flip_twice_restores_pair_but_not_text() {
        let h = harness();
        let original = h.orchestrator.snapshot().pair;
        h.orchestrator.on_text_changed("так");
        sleep(Duration::from_secs(1)).await;

        h.orchestrator.on_flip();
        h.orchestrator.on_flip();
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.pair, original);
        assert_eq!(snap.translation, "", "result is regenerated, not swapped back");

        sleep(Duration::from_secs(1)).await;
        assert_eq!(h.orchestrator.snapshot().translation, "cs:так");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_keeps_previous_translation() {
        let h = harness();
        h.orchestrator.on_text_changed("ok");
        sleep(Duration::from_secs(1)).await;

        h.backend.fail("boom");
        h.orchestrator.on_text_changed("boom");
        assert!(h.orchestrator.snapshot().loading());

        sleep(Duration::from_secs(1)).await;
        let snap = h.orchestrator.snapshot();
        assert!(!snap.loading());
        assert_eq!(snap.translation, "cs:ok");
        assert_eq!((snap.dispatched, snap.applied), (2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_lookup_times_out() {
        let h = harness();
        h.backend.delay("slow", Duration::from_secs(3600));
        h.orchestrator.on_text_changed("slow");

        sleep(Duration::from_secs(10)).await;
        assert!(h.orchestrator.snapshot().loading());

        sleep(Duration::from_secs(30)).await;
        let snap = h.orchestrator.snapshot();
        assert!(!snap.loading());
        assert_eq!(snap.applied, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_empties_source_and_translation() {
        let h = harness();
        h.orchestrator.on_text_changed("Ahoj");
        sleep(Duration::from_secs(1)).await;

        h.orchestrator.on_clear();
        sleep(Duration::from_secs(1)).await;
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.source, "");
        assert_eq!(snap.translation, "");
        assert_eq!(snap.transliteration, "");
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_saved_after_long_pause_per_source_language() {
        let h = harness();
        h.orchestrator.on_text_changed("При");
        h.orchestrator.on_text_changed("Привіт");
        sleep(Duration::from_secs(5)).await;
        assert!(h.orchestrator.history().is_empty());

        sleep(Duration::from_secs(6)).await;
        let texts: Vec<_> = h.orchestrator.history().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, ["Привіт"]);

        h.orchestrator.on_flip();
        assert!(h.orchestrator.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn flip_keeps_pending_history_in_typed_language() {
        let h = harness();
        h.orchestrator.on_text_changed("Привіт");
        sleep(Duration::from_secs(2)).await;
        h.orchestrator.on_flip();
        sleep(Duration::from_secs(11)).await;

        let texts = |language: &str| -> Vec<String> {
            h.store.list(language).unwrap().into_iter().map(|e| e.text).collect()
        };
        assert_eq!(texts("uk"), ["Привіт"]);
        assert!(texts("cs").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_pending_history() {
        let h = harness();
        h.orchestrator.on_text_changed("Добраніч");
        sleep(Duration::from_secs(1)).await;
        assert!(h.orchestrator.history().is_empty());

        h.orchestrator.shutdown().await;
        let texts: Vec<_> = h.orchestrator.history().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, ["Добраніч"]);
    }

    #[tokio::test(start_paused = true)]
    async fn history_selection_is_translated() {
        let h = harness();
        h.orchestrator.on_history_selected("Добрий день");
        sleep(Duration::from_secs(1)).await;
        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.source, "Добрий день");
        assert_eq!(snap.translation, "cs:Добрий день");
    }

    #[tokio::test(start_paused = true)]
    async fn view_sees_loading_then_translation() {
        let h = harness();
        h.orchestrator.on_text_changed("den");
        sleep(Duration::from_secs(1)).await;

        let events = drain(&h.events);
        assert_eq!(
            events,
            [
                ViewEvent::LanguagesChanged(Default::default()),
                ViewEvent::SourceChanged("den".into()),
                ViewEvent::LoadingChanged(true),
                ViewEvent::TranslationChanged {
                    text: "cs:den".into(),
                    transliteration: "цс:ден".into(),
                },
                ViewEvent::LoadingChanged(false),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn starts_in_stored_direction() {
        let store = Arc::new(MemoryStore::new(100));
        store.set(DEFAULT_SOURCE_KEY, "cs").unwrap();
        let h = harness_with(store);

        let snap = h.orchestrator.snapshot();
        assert_eq!(snap.pair.source.id, "cs");
        assert_eq!(snap.pair.target.id, "uk");
    }

    #[tokio::test(start_paused = true)]
    async fn instances_do_not_share_counters() {
        let a = harness();
        let b = harness();
        a.orchestrator.on_text_changed("one");
        a.orchestrator.on_text_changed("two");
        b.orchestrator.on_text_changed("uno");
        sleep(Duration::from_secs(1)).await;

        assert_eq!(a.orchestrator.snapshot().dispatched, 2);
        let snap = b.orchestrator.snapshot();
        assert_eq!((snap.dispatched, snap.applied), (1, 1));
        assert_eq!(snap.translation, "cs:uno");
    }
}
