//! Terminal User Interface Module
//!
//! Terminal client for the proxy server, built with Ratatui.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │            PubMed AI Search  [ AI ]  ★ 3 saved                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ ┌─ Ask in plain language ─────────────────────────────────────┐ │
//! │ │ does coffee raise blood pressure?                           │ │
//! │ └─────────────────────────────────────────────────────────────┘ │
//! │  Filters: last 5 years, free                                    │
//! │ ┌─ Results (20) ──────────────┐┌─ Details ─────────────────────┐ │
//! │ │ ▶ ☆ Coffee and hypertension ││ Abstract / AI Summary /       │ │
//! │ │     Lee et al. • BMJ • 2019 ││ Related Articles              │ │
//! │ └─────────────────────────────┘└───────────────────────────────┘ │
//! │ 20 articles │ [Enter] Search [Tab] Mode [Ctrl+S] Save ...       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each loop iteration draws the whole frame from [`App`], applies finished
//! background work, then waits for the next key press or tick.

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, SearchMode, SearchStatus, View};
pub use event::{AppAction, EventHandler};

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::library::LibraryStorage;
use anyhow::Context;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use tracing::{error, info};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the terminal client against the proxy at `config.client.proxy_url`.
pub async fn run(config: Config) -> anyhow::Result<()> {
    info!(proxy = %config.client.proxy_url, "Starting TUI mode");

    // Load before touching the terminal so errors print normally
    let storage = LibraryStorage::with_path(config.client.data_dir.clone());
    let library = storage
        .load()
        .await
        .with_context(|| format!("Failed to load library from {}", storage.path().display()))?;

    let mut terminal = init_terminal()?;
    let mut app = App::new(ApiClient::new(config.client.proxy_url.as_str()), storage, library);
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

async fn run_app(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        app.poll_events();

        // Ticks arrive every 100ms, so background results show up promptly
        match events.next().await {
            Some(action) => app.handle_action(action).await,
            None => break,
        }
        if app.should_quit {
            break;
        }
    }

    info!("TUI exited normally");
    Ok(())
}
