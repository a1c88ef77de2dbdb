mod app;
mod global_prefs;
mod handlers;
mod model;
mod services;
mod state;
mod ui;

use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use global_prefs::GlobalPrefs;
use ratatui::{backend::CrosstermBackend, Terminal};
use services::{ApiCommand, ApiEvent, ForumApi};
use state::{AppConfig, TICK_MS};
use std::{error::Error, fs, io, path::{Path, PathBuf}, sync::Mutex, time::Duration};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Terminal client for a single forum thread
#[derive(Parser, Debug)]
#[command(name = "forum-thread", version, about, long_about = None)]
struct Args {
    /// Numeric id of the thread to open
    thread_id: u64,

    /// Base URL of the forum API
    #[arg(long, default_value = services::api::DEFAULT_API_BASE)]
    api_base: String,

    /// Wayback Machine prefix used by "Recover from Internet Archive"
    #[arg(long, default_value = services::api::DEFAULT_ARCHIVE_BASE)]
    archive_base: String,

    /// Reload the thread every N seconds (0 disables)
    #[arg(long, default_value_t = 0)]
    refresh_secs: u64,

    /// Log file; defaults to forum-thread.log in the data directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Application events
enum AppEvent {
    Terminal(CEvent),
    Api(ApiEvent),
    Tick,
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("forum-thread"))
        .unwrap_or_else(|| PathBuf::from(".forum-thread"))
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let data_dir = data_dir();
    fs::create_dir_all(&data_dir)?;
    init_logging(&args.log_file.clone().unwrap_or_else(|| data_dir.join("forum-thread.log")))?;

    // Initialize global preferences
    global_prefs::init_global_prefs(GlobalPrefs::config_path());

    let config = AppConfig {
        api_base: args.api_base.trim_end_matches('/').to_string(),
        refresh_interval: (args.refresh_secs > 0).then(|| Duration::from_secs(args.refresh_secs)),
        ..AppConfig::default()
    };
    let api = ForumApi::new(config.api_base.clone())?.with_archive_base(args.archive_base.clone());
    info!(id = args.thread_id, api_base = %config.api_base, "starting");

    // Create event channels
    let (tx_to_api, rx_from_ui) = mpsc::unbounded_channel::<ApiCommand>();
    let (tx_to_ui, mut rx_from_api) = mpsc::unbounded_channel::<ApiEvent>();
    let mut app = App::new(args.thread_id, config, tx_to_api, data_dir);

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    // Enable terminal raw mode
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create event loop channels
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    // Spawn terminal event handler
    let event_tx_clone = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;

            // Check for terminal events (non-blocking)
            while event::poll(Duration::from_millis(0)).unwrap_or(false) {
                match event::read() {
                    Ok(event) => {
                        if event_tx_clone.send(AppEvent::Terminal(event)).is_err() {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }

            // Send tick event
            if event_tx_clone.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    // Spawn api event forwarder
    let event_tx_clone = event_tx.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx_from_api.recv().await {
            if event_tx_clone.send(AppEvent::Api(msg)).is_err() {
                break;
            }
        }
    });

    // Spawn http worker
    tokio::spawn(services::api::run_worker(api, rx_from_ui, tx_to_ui));

    app.request_fetch();

    // Main application loop
    while !app.ui.should_quit {
        // Render UI
        terminal.draw(|f| ui::ui(f, &mut app))?;

        // Handle events
        if let Some(event) = event_rx.recv().await {
            match event {
                AppEvent::Terminal(CEvent::Key(key)) => handlers::handle_key_event(key, &mut app),
                AppEvent::Terminal(_) => {}
                AppEvent::Api(api_event) => app.handle_api_event(api_event),
                AppEvent::Tick => app.on_tick(),
            }
        }
    }

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("bye");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli() {
        let args = Args::try_parse_from(["forum-thread", "12", "--refresh-secs", "30"]).unwrap();
        assert_eq!(args.thread_id, 12);
        assert_eq!(args.refresh_secs, 30);
        assert_eq!(args.api_base, services::api::DEFAULT_API_BASE);
        assert!(args.log_file.is_none());
    }

    #[test]
    fn rejects_non_numeric_thread_id() {
        assert!(Args::try_parse_from(["forum-thread", "abc"]).is_err());
        assert!(Args::try_parse_from(["forum-thread"]).is_err());
    }
}
