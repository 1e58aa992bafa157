//! Event Handling
//!
//! Maps keyboard and timer events to [`AppAction`]s. The mapping is the same
//! in every view; [`App`](super::App) decides what an action means where.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Ctrl+Q
    Quit,
    /// Ctrl+C
    ForceQuit,
    /// Enter: run the search, or confirm a prompt
    Submit,
    ToggleLibrary,
    ToggleHelp,
    /// Close prompts, go back to the search view
    Escape,
    Up,
    Down,
    PageUp,
    PageDown,
    /// Tab: switch AI/direct mode, or the focused library pane
    NextField,
    PrevField,
    /// Save or unsave the selected article
    ToggleSave,
    /// Generate (or retry) the summary of the selected article
    Summarize,
    /// Load related articles for the selected article
    Related,
    ToggleFreeFullText,
    CycleDate,
    ToggleReviews,
    ToggleExcludePreprints,
    ToggleAssociatedData,
    CycleArticleType,
    CycleSpecies,
    CycleLanguage,
    CycleAge,
    /// Load the next example search
    NextPreset,
    /// Recall the previous search from history
    RecallHistory,
    /// Anything else, handled by the input box or the library commands
    Input(KeyEvent),
    Tick,
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = Self::map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }

    fn map_event(event: Event) -> Option<AppAction> {
        match event {
            // Windows reports releases too
            Event::Key(key) if key.kind == KeyEventKind::Press => Self::map_key_event(key),
            _ => None,
        }
    }

    pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
            (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),

            (KeyModifiers::CONTROL, KeyCode::Char('l')) => Some(AppAction::ToggleLibrary),
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(AppAction::ToggleSave),
            (KeyModifiers::CONTROL, KeyCode::Char('g')) => Some(AppAction::Summarize),
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(AppAction::Related),

            // Filters
            (KeyModifiers::CONTROL, KeyCode::Char('f')) => Some(AppAction::ToggleFreeFullText),
            (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(AppAction::CycleDate),
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => Some(AppAction::ToggleReviews),
            (KeyModifiers::CONTROL, KeyCode::Char('p')) => Some(AppAction::ToggleExcludePreprints),
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => Some(AppAction::ToggleAssociatedData),

            (KeyModifiers::SHIFT, KeyCode::BackTab) => Some(AppAction::PrevField),

            (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
                KeyCode::Esc => Some(AppAction::Escape),
                KeyCode::Enter => Some(AppAction::Submit),
                KeyCode::Tab => Some(AppAction::NextField),
                KeyCode::BackTab => Some(AppAction::PrevField),

                KeyCode::F(1) => Some(AppAction::ToggleHelp),
                KeyCode::F(2) => Some(AppAction::NextPreset),
                KeyCode::F(3) => Some(AppAction::CycleArticleType),
                KeyCode::F(4) => Some(AppAction::CycleSpecies),
                KeyCode::F(5) => Some(AppAction::CycleLanguage),
                KeyCode::F(6) => Some(AppAction::CycleAge),
                KeyCode::F(7) => Some(AppAction::RecallHistory),

                KeyCode::Up => Some(AppAction::Up),
                KeyCode::Down => Some(AppAction::Down),
                KeyCode::PageUp => Some(AppAction::PageUp),
                KeyCode::PageDown => Some(AppAction::PageDown),

                _ => Some(AppAction::Input(key)),
            },

            _ => Some(AppAction::Input(key)),
        }
    }
}
