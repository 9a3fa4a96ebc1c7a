use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use live_translate::{Config, JsonFileStore, LindatTranslator, MemoryStore, Orchestrator, Store, ViewEvent};

const HELP: &str = "Type text to translate. Commands: :flip  :clear  :history  :quit";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    log::info!("live-translate starting");

    let ephemeral = std::env::args().skip(1).any(|arg| arg == "--ephemeral");

    let config = Config::load();
    if !Config::exists() {
        if let Err(e) = config.save() {
            log::warn!("Failed to save config: {e}");
        }
    }

    let store: Arc<dyn Store> = if ephemeral {
        Arc::new(MemoryStore::new(config.history_limit))
    } else {
        let store = JsonFileStore::open_default(config.history_limit);
        log::info!("Using store at {}", store.path().display());
        Arc::new(store)
    };
    let translator = Arc::new(LindatTranslator::new(&config.api_url));

    let (view_tx, view_rx) = async_channel::unbounded::<ViewEvent>();
    let orchestrator = Orchestrator::new(&config, translator, store, view_tx);

    // Render view events as they arrive
    tokio::spawn(async move {
        while let Ok(event) = view_rx.recv().await {
            render(event);
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {e}");
                break;
            }
        };

        match line.trim() {
            ":quit" | ":q" => break,
            ":flip" => orchestrator.on_flip(),
            ":clear" => orchestrator.on_clear(),
            ":history" => {
                let history = orchestrator.history();
                if history.is_empty() {
                    println!("  (no history yet)");
                }
                for entry in history {
                    println!("  {}  {}", entry.timestamp, entry.text);
                }
            }
            ":help" => println!("{HELP}"),
            _ => orchestrator.on_text_changed(&line),
        }
    }

    // The current-thread runtime drops pending timers on exit.
    orchestrator.shutdown().await;
    log::info!("live-translate exiting");
}

fn render(event: ViewEvent) {
    match event {
        ViewEvent::LanguagesChanged(pair) => {
            println!("[{} -> {}]", pair.source.name, pair.target.name);
        }
        ViewEvent::LoadingChanged(true) => println!("  ..."),
        ViewEvent::TranslationChanged {
            text,
            transliteration,
        } => {
            if text.is_empty() {
                return;
            }
            println!("  = {text}");
            if transliteration != text {
                println!("    {transliteration}");
            }
        }
        ViewEvent::SourceChanged(_) | ViewEvent::LoadingChanged(false) => {}
    }
}
