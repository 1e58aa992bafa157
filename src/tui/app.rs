//! Application State
//!
//! The `App` holds everything the terminal client shows. User actions and
//! background results both mutate it; the UI is redrawn from it every loop.
//!
//! Network work runs in spawned tasks that report back over an mpsc channel
//! as [`AppEvent`]s. Results tagged with an old query generation are dropped.

use crate::api_client::ApiClient;
use crate::library::{Library, LibraryError, LibraryStorage, SaveToggle};
use crate::pubmed::Article;
use crate::search::filters::{self, cycle_option};
use crate::search::{
    extract_keywords, presets, run_batch, BatchOutcome, BatchResult, Paginator, SearchFilters,
    SearchHistory,
};
use crate::tui::event::AppAction;
use chrono::{Datelike, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tui_textarea::TextArea;

/// Start loading the next batch when the selection is this close to the end.
const LOAD_AHEAD: usize = 3;

const PAGE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Search,
    Library,
    Help,
}

/// AI mode turns plain language into a PubMed query first; direct mode sends
/// the input as typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Ai,
    Direct,
}

impl SearchMode {
    pub fn toggle(self) -> Self {
        match self {
            SearchMode::Ai => SearchMode::Direct,
            SearchMode::Direct => SearchMode::Ai,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SearchMode::Ai => "AI",
            SearchMode::Direct => "PubMed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    GeneratingQuery,
    Searching,
    Results,
    NoResults,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Loading,
    Ready(String),
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelatedState {
    Loading,
    /// Empty when PubMed knows no related articles
    Ready(Vec<Article>),
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryPane {
    #[default]
    Folders,
    Papers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    NewFolder,
    RenameFolder { id: String },
    DeleteFolder { id: String },
    RenamePaper { pmid: String },
    MovePaper { pmid: String },
}

impl PromptKind {
    pub fn label(&self) -> &'static str {
        match self {
            PromptKind::NewFolder => "New folder name",
            PromptKind::RenameFolder { .. } => "Rename folder to",
            PromptKind::DeleteFolder { .. } => "Delete folder and its articles? Enter to confirm",
            PromptKind::RenamePaper { .. } => "Rename article to",
            PromptKind::MovePaper { .. } => "Move to folder",
        }
    }
}

/// Single-line prompt shown at the bottom of the library view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// Results of background tasks
#[derive(Debug)]
pub enum AppEvent {
    QueryGenerated {
        ticket: u64,
        result: Result<String, String>,
    },
    Batch(BatchResult),
    Summary {
        pmid: String,
        result: Result<String, String>,
    },
    Related {
        pmid: String,
        result: Result<Vec<Article>, String>,
    },
}

pub struct App {
    client: Arc<ApiClient>,
    storage: LibraryStorage,

    // UI State
    pub view: View,
    pub should_quit: bool,
    pub tick: u64,
    /// One-line feedback shown in the status bar
    pub notice: Option<String>,

    // Search State
    pub mode: SearchMode,
    pub input: TextArea<'static>,
    pub history: SearchHistory,
    history_cursor: Option<usize>,
    pub filters: SearchFilters,
    pub preset_index: Option<usize>,
    pub status: SearchStatus,
    /// What the user typed for the current search
    pub user_search: String,
    /// The query sent to PubMed, filters included
    pub active_query: String,
    pub keywords: Vec<String>,
    pub paginator: Paginator,
    pub results: Vec<Article>,
    pub selected: usize,
    pub summaries: HashMap<String, SummaryState>,
    pub related: HashMap<String, RelatedState>,
    query_ticket: u64,

    // Library State
    pub library: Library,
    pub library_pane: LibraryPane,
    pub folder_index: usize,
    pub paper_index: usize,
    pub prompt: Option<Prompt>,

    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

fn new_input(mode: SearchMode, text: &str) -> TextArea<'static> {
    let mut input = TextArea::new(vec![text.to_string()]);
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.set_placeholder_text(match mode {
        SearchMode::Ai => "Describe what you are looking for, e.g. does coffee raise blood pressure?",
        SearchMode::Direct => "PubMed query, e.g. hypertension[MeSH] AND coffee[tiab]",
    });
    input.move_cursor(tui_textarea::CursorMove::End);
    input
}

impl App {
    pub fn new(client: ApiClient, storage: LibraryStorage, library: Library) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let mode = SearchMode::default();

        Self {
            client: Arc::new(client),
            storage,
            view: View::Search,
            should_quit: false,
            tick: 0,
            notice: None,
            mode,
            input: new_input(mode, ""),
            history: SearchHistory::default(),
            history_cursor: None,
            filters: SearchFilters::default(),
            preset_index: None,
            status: SearchStatus::Idle,
            user_search: String::new(),
            active_query: String::new(),
            keywords: Vec::new(),
            paginator: Paginator::default(),
            results: Vec::new(),
            selected: 0,
            summaries: HashMap::new(),
            related: HashMap::new(),
            query_ticket: 0,
            library,
            library_pane: LibraryPane::Folders,
            folder_index: 0,
            paper_index: 0,
            prompt: None,
            event_rx: rx,
            event_tx: tx,
        }
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join(" ").trim().to_string()
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.results.get(self.selected)
    }

    /// Apply finished background work.
    pub fn poll_events(&mut self) {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::QueryGenerated { ticket, result } => {
                if ticket != self.query_ticket {
                    return;
                }
                match result {
                    Ok(query) => {
                        info!(query = %query, "Generated PubMed query");
                        self.start_search(&query);
                    }
                    Err(e) => {
                        error!(error = %e, "Query generation failed");
                        self.status = SearchStatus::Error(e);
                    }
                }
            }
            AppEvent::Batch(result) => {
                if !self.paginator.finish(&result) {
                    return;
                }
                match result.outcome {
                    BatchOutcome::Articles(articles) => {
                        self.results.extend(articles);
                        self.status = SearchStatus::Results;
                    }
                    BatchOutcome::Exhausted => {
                        if self.results.is_empty() {
                            self.status = SearchStatus::NoResults;
                        }
                    }
                    BatchOutcome::Failed(e) => {
                        // Already loaded results stay as they are
                        if self.results.is_empty() {
                            self.status = SearchStatus::Error(e);
                        }
                    }
                }
            }
            AppEvent::Summary { pmid, result } => {
                let state = match result {
                    Ok(summary) => SummaryState::Ready(summary),
                    Err(e) => {
                        warn!(pmid = %pmid, error = %e, "Summary failed");
                        SummaryState::Failed
                    }
                };
                self.summaries.insert(pmid, state);
            }
            AppEvent::Related { pmid, result } => {
                let state = match result {
                    Ok(articles) => RelatedState::Ready(articles),
                    Err(e) => {
                        warn!(pmid = %pmid, error = %e, "Related articles failed");
                        RelatedState::Failed
                    }
                };
                self.related.insert(pmid, state);
            }
        }
    }

    pub async fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help { View::Search } else { View::Help };
            }
            AppAction::ToggleLibrary => {
                self.prompt = None;
                self.view = if self.view == View::Library { View::Search } else { View::Library };
                self.clamp_library_selection();
            }
            AppAction::Escape => {
                if self.prompt.take().is_none() {
                    self.view = View::Search;
                }
                self.notice = None;
            }
            _ => match self.view {
                View::Search => self.handle_search_action(action).await,
                View::Library => self.handle_library_action(action).await,
                // Any other key closes help
                View::Help => self.view = View::Search,
            },
        }
    }

    async fn handle_search_action(&mut self, action: AppAction) {
        match action {
            AppAction::Submit => self.submit_search(),
            AppAction::NextField | AppAction::PrevField => {
                self.mode = self.mode.toggle();
                let text = self.input_text();
                self.input = new_input(self.mode, &text);
            }
            AppAction::Up => self.select(self.selected.saturating_sub(1)),
            AppAction::Down => self.select(self.selected + 1),
            AppAction::PageUp => self.select(self.selected.saturating_sub(PAGE)),
            AppAction::PageDown => self.select(self.selected + PAGE),
            AppAction::ToggleSave => self.toggle_save_selected().await,
            AppAction::Summarize => self.request_summary(),
            AppAction::Related => self.request_related(),
            AppAction::ToggleFreeFullText => {
                self.filters.free_full_text = !self.filters.free_full_text;
            }
            AppAction::CycleDate => self.filters.date = self.filters.date.cycle(),
            AppAction::ToggleReviews => self.filters.reviews_only = !self.filters.reviews_only,
            AppAction::ToggleExcludePreprints => {
                self.filters.exclude_preprints = !self.filters.exclude_preprints;
            }
            AppAction::ToggleAssociatedData => {
                self.filters.associated_data = !self.filters.associated_data;
            }
            AppAction::CycleArticleType => {
                self.filters.article_type =
                    cycle_option(self.filters.article_type.as_deref(), filters::ARTICLE_TYPES);
            }
            AppAction::CycleSpecies => {
                self.filters.species = cycle_option(self.filters.species.as_deref(), filters::SPECIES);
            }
            AppAction::CycleLanguage => {
                self.filters.language =
                    cycle_option(self.filters.language.as_deref(), filters::LANGUAGES);
            }
            AppAction::CycleAge => {
                self.filters.age = cycle_option(self.filters.age.as_deref(), filters::AGES);
            }
            AppAction::NextPreset => self.load_next_preset(),
            AppAction::RecallHistory => self.recall_history(),
            AppAction::Input(key) => {
                self.history_cursor = None;
                self.input.input(key);
            }
            _ => {}
        }
    }

    /// Start a search from the input box.
    fn submit_search(&mut self) {
        let text = self.input_text();
        if text.is_empty() {
            return;
        }

        self.history.push(&text);
        self.history_cursor = None;
        self.user_search = text.clone();
        self.notice = None;
        self.clear_results();
        // Invalidate batches of the previous search while the query is generated
        self.paginator.reset(String::new());
        self.query_ticket += 1;

        match self.mode {
            SearchMode::Direct => self.start_search(&text),
            SearchMode::Ai => {
                self.status = SearchStatus::GeneratingQuery;
                let client = Arc::clone(&self.client);
                let tx = self.event_tx.clone();
                let ticket = self.query_ticket;

                tokio::spawn(async move {
                    let result = client.generate_query(&text).await.map_err(|e| e.to_string());
                    tx.send(AppEvent::QueryGenerated { ticket, result }).await.ok();
                });
            }
        }
    }

    /// Apply the filters to `base_query` and load the first batch.
    fn start_search(&mut self, base_query: &str) {
        self.keywords = extract_keywords(base_query);
        self.active_query = self.filters.apply(base_query, Utc::now().year());
        info!(query = %self.active_query, "Starting search");

        self.paginator.reset(self.active_query.clone());
        self.status = SearchStatus::Searching;
        self.load_more();
    }

    fn clear_results(&mut self) {
        self.results.clear();
        self.selected = 0;
        self.summaries.clear();
        self.related.clear();
        self.keywords.clear();
        self.active_query.clear();
    }

    /// Fetch the next batch unless one is in flight or the query is done.
    fn load_more(&mut self) {
        let Some(request) = self.paginator.try_begin() else {
            return;
        };
        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let result = run_batch(client.as_ref(), &request).await;
            tx.send(AppEvent::Batch(result)).await.ok();
        });
    }

    fn select(&mut self, index: usize) {
        if self.results.is_empty() {
            return;
        }
        self.selected = index.min(self.results.len() - 1);
        if self.selected + LOAD_AHEAD >= self.results.len() {
            self.load_more();
        }
    }

    async fn toggle_save_selected(&mut self) {
        let Some(article) = self.selected_article() else {
            return;
        };
        let (pmid, title) = (article.pmid.clone(), article.title.clone());

        self.notice = Some(match self.library.toggle_save(&pmid, &title) {
            SaveToggle::Saved => "Saved to Uncategorized".to_string(),
            SaveToggle::Removed { .. } => "Removed from library".to_string(),
        });
        self.persist_library().await;
    }

    /// Summarize the selected article. Also serves as retry after a failure.
    fn request_summary(&mut self) {
        let Some(article) = self.selected_article() else {
            return;
        };
        if matches!(
            self.summaries.get(&article.pmid),
            Some(SummaryState::Loading) | Some(SummaryState::Ready(_))
        ) {
            return;
        }

        let pmid = article.pmid.clone();
        let title = article.title.clone();
        let abstract_text = article.abstract_text.clone();
        let user_search = self.user_search.clone();
        self.summaries.insert(pmid.clone(), SummaryState::Loading);

        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = client
                .summarize(&title, &abstract_text, &user_search)
                .await
                .map_err(|e| e.to_string());
            tx.send(AppEvent::Summary { pmid, result }).await.ok();
        });
    }

    fn request_related(&mut self) {
        let Some(article) = self.selected_article() else {
            return;
        };
        if matches!(
            self.related.get(&article.pmid),
            Some(RelatedState::Loading) | Some(RelatedState::Ready(_))
        ) {
            return;
        }

        let pmid = article.pmid.clone();
        self.related.insert(pmid.clone(), RelatedState::Loading);

        let client = Arc::clone(&self.client);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = client.related_papers(&pmid).await.map_err(|e| e.to_string());
            tx.send(AppEvent::Related { pmid, result }).await.ok();
        });
    }

    /// Put the next example search into the input box, in direct mode.
    fn load_next_preset(&mut self) {
        let all = presets();
        let index = self.preset_index.map_or(0, |i| (i + 1) % all.len());
        let Some(preset) = all.get(index) else {
            return;
        };
        let Some(query) = preset.builder.build() else {
            return;
        };

        self.preset_index = Some(index);
        self.mode = SearchMode::Direct;
        self.input = new_input(self.mode, &query);
        self.notice = Some(format!("Example: {}", preset.title));
    }

    /// Step back through earlier searches, newest first, wrapping around.
    fn recall_history(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = self.history_cursor.map_or(0, |i| (i + 1) % self.history.len());
        if let Some(query) = self.history.get(index) {
            let query = query.to_string();
            self.input = new_input(self.mode, &query);
            self.history_cursor = Some(index);
        }
    }

    // === Library ===

    pub fn selected_folder_id(&self) -> Option<String> {
        self.library.folders().get(self.folder_index).map(|f| f.id.clone())
    }

    pub fn selected_paper_pmid(&self) -> Option<String> {
        self.library
            .folders()
            .get(self.folder_index)
            .and_then(|f| f.papers.get(self.paper_index))
            .map(|p| p.pmid.clone())
    }

    fn clamp_library_selection(&mut self) {
        let folders = self.library.folders();
        self.folder_index = self.folder_index.min(folders.len().saturating_sub(1));
        let papers = folders.get(self.folder_index).map_or(0, |f| f.papers.len());
        self.paper_index = self.paper_index.min(papers.saturating_sub(1));
    }

    async fn handle_library_action(&mut self, action: AppAction) {
        if self.prompt.is_some() {
            match action {
                AppAction::Submit => self.confirm_prompt().await,
                AppAction::Input(key) => self.edit_prompt(key),
                _ => {}
            }
            return;
        }

        match action {
            AppAction::NextField | AppAction::PrevField => {
                self.library_pane = match self.library_pane {
                    LibraryPane::Folders => LibraryPane::Papers,
                    LibraryPane::Papers => LibraryPane::Folders,
                };
            }
            AppAction::Up => self.move_library_selection(-1),
            AppAction::Down => self.move_library_selection(1),
            AppAction::Input(key) => self.library_command(key).await,
            _ => {}
        }
    }

    fn move_library_selection(&mut self, delta: isize) {
        match self.library_pane {
            LibraryPane::Folders => {
                self.folder_index = self.folder_index.saturating_add_signed(delta);
                self.paper_index = 0;
            }
            LibraryPane::Papers => {
                self.paper_index = self.paper_index.saturating_add_signed(delta);
            }
        }
        self.clamp_library_selection();
    }

    fn open_prompt(&mut self, kind: PromptKind, input: impl Into<String>) {
        self.notice = None;
        self.prompt = Some(Prompt { kind, input: input.into() });
    }

    /// Single-key commands: `n` new folder, `r` rename, `d` delete,
    /// `m` move article.
    async fn library_command(&mut self, key: KeyEvent) {
        let KeyCode::Char(c) = key.code else {
            return;
        };
        let folder = self.library.folders().get(self.folder_index).cloned();

        match (c, self.library_pane) {
            ('n', _) => self.open_prompt(PromptKind::NewFolder, ""),
            ('r', LibraryPane::Folders) => {
                if let Some(folder) = folder {
                    if folder.is_default() {
                        self.notice = Some(LibraryError::DefaultFolderLocked.to_string());
                    } else {
                        self.open_prompt(PromptKind::RenameFolder { id: folder.id }, folder.name);
                    }
                }
            }
            ('d', LibraryPane::Folders) => {
                if let Some(folder) = folder {
                    if folder.is_default() {
                        self.notice = Some(LibraryError::DefaultFolderLocked.to_string());
                    } else {
                        self.open_prompt(PromptKind::DeleteFolder { id: folder.id }, "");
                    }
                }
            }
            ('r', LibraryPane::Papers) => {
                let paper = folder.and_then(|f| f.papers.get(self.paper_index).cloned());
                if let Some(paper) = paper {
                    self.open_prompt(PromptKind::RenamePaper { pmid: paper.pmid }, paper.title);
                }
            }
            ('m', LibraryPane::Papers) => {
                if let Some(pmid) = self.selected_paper_pmid() {
                    self.open_prompt(PromptKind::MovePaper { pmid }, "");
                }
            }
            ('d', LibraryPane::Papers) => {
                if let Some(pmid) = self.selected_paper_pmid() {
                    if self.library.remove(&pmid) {
                        self.notice = Some(format!("Removed {} from library", pmid));
                        self.clamp_library_selection();
                        self.persist_library().await;
                    }
                }
            }
            _ => {}
        }
    }

    fn edit_prompt(&mut self, key: KeyEvent) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        if matches!(prompt.kind, PromptKind::DeleteFolder { .. }) {
            return;
        }
        match key.code {
            KeyCode::Char(c) => prompt.input.push(c),
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            _ => {}
        }
    }

    async fn confirm_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let value = prompt.input.trim().to_string();

        let outcome: Result<String, LibraryError> = match prompt.kind {
            PromptKind::NewFolder => self
                .library
                .create_folder(&value)
                .map(|_| format!("Created folder \"{}\"", value)),
            PromptKind::RenameFolder { id } => self
                .library
                .rename_folder(&id, &value)
                .map(|_| format!("Renamed folder to \"{}\"", value)),
            PromptKind::DeleteFolder { id } => self
                .library
                .delete_folder(&id)
                .map(|removed| format!("Deleted folder and {} saved articles", removed.len())),
            PromptKind::RenamePaper { pmid } => {
                if value.is_empty() {
                    Err(LibraryError::BlankName)
                } else if self.library.rename_paper(&pmid, &value) {
                    Ok("Article renamed".to_string())
                } else {
                    Err(LibraryError::PaperNotFound(pmid))
                }
            }
            PromptKind::MovePaper { pmid } => {
                let target = self
                    .library
                    .folders()
                    .iter()
                    .find(|f| f.name.eq_ignore_ascii_case(&value))
                    .map(|f| f.id.clone());
                match target {
                    Some(id) => self
                        .library
                        .move_paper(&pmid, &id)
                        .map(|_| format!("Moved to \"{}\"", value)),
                    None => Err(LibraryError::FolderNotFound(value.clone())),
                }
            }
        };

        match outcome {
            Ok(message) => {
                self.notice = Some(message);
                self.clamp_library_selection();
                self.persist_library().await;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    async fn persist_library(&mut self) {
        if let Err(e) = self.storage.save(&self.library).await {
            error!(error = %e, "Failed to save library");
            self.notice = Some(format!("Could not save library: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubmed::article::NO_YEAR;
    use crossterm::event::KeyModifiers;
    use tempfile::TempDir;

    fn article(pmid: &str) -> Article {
        Article {
            pmid: pmid.to_string(),
            title: format!("Article {}", pmid),
            abstract_text: "Abstract".to_string(),
            journal: "Lancet".to_string(),
            year: NO_YEAR.to_string(),
            first_author: None,
            pmc_id: None,
            is_free: false,
        }
    }

    /// App against an unreachable proxy; tests never let it make requests
    /// they depend on.
    fn test_app(dir: &TempDir) -> App {
        App::new(
            ApiClient::new("http://127.0.0.1:9"),
            LibraryStorage::with_path(dir.path().to_path_buf()),
            Library::default(),
        )
    }

    fn batch(app: &App, outcome: BatchOutcome) -> AppEvent {
        AppEvent::Batch(BatchResult {
            generation: app.paginator.generation(),
            start: app.paginator.offset(),
            outcome,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.input.input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn char_key(c: char) -> AppAction {
        AppAction::Input(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_direct_search_applies_filters() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_action(AppAction::NextField).await;
        assert_eq!(app.mode, SearchMode::Direct);

        app.handle_action(AppAction::ToggleFreeFullText).await;
        type_text(&mut app, "asthma[tiab]");
        app.handle_action(AppAction::Submit).await;

        assert_eq!(app.active_query, "asthma[tiab] AND free full text[filter]");
        assert_eq!(app.status, SearchStatus::Searching);
        assert!(app.paginator.is_loading());
        assert_eq!(app.history.get(0), Some("asthma[tiab]"));
        assert_eq!(app.keywords, vec!["asthma".to_string()]);
    }

    #[tokio::test]
    async fn test_batches_extend_results() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.mode = SearchMode::Direct;
        type_text(&mut app, "gout");
        app.handle_action(AppAction::Submit).await;

        let event = batch(&app, BatchOutcome::Articles(vec![article("1"), article("2")]));
        app.handle_event(event);
        assert_eq!(app.status, SearchStatus::Results);
        assert_eq!(app.results.len(), 2);
        assert_eq!(app.paginator.offset(), 10);

        // A failure after the first batch keeps what is already shown
        app.paginator.try_begin();
        let event = batch(&app, BatchOutcome::Failed("boom".to_string()));
        app.handle_event(event);
        assert_eq!(app.status, SearchStatus::Results);
        assert_eq!(app.results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_search_shows_no_results() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.mode = SearchMode::Direct;
        type_text(&mut app, "zzzz");
        app.handle_action(AppAction::Submit).await;

        let event = batch(&app, BatchOutcome::Exhausted);
        app.handle_event(event);
        assert_eq!(app.status, SearchStatus::NoResults);
        assert!(app.paginator.is_exhausted());
    }

    #[tokio::test]
    async fn test_stale_batch_is_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.mode = SearchMode::Direct;
        type_text(&mut app, "first");
        app.handle_action(AppAction::Submit).await;
        let stale = batch(&app, BatchOutcome::Articles(vec![article("1")]));

        app.input = new_input(app.mode, "second");
        app.handle_action(AppAction::Submit).await;
        app.handle_event(stale);

        assert!(app.results.is_empty());
        assert_eq!(app.status, SearchStatus::Searching);
    }

    #[tokio::test]
    async fn test_ai_query_ticket() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        type_text(&mut app, "coffee and blood pressure");
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.status, SearchStatus::GeneratingQuery);

        app.handle_event(AppEvent::QueryGenerated {
            ticket: 0,
            result: Ok("ignored[tiab]".to_string()),
        });
        assert_eq!(app.status, SearchStatus::GeneratingQuery);

        app.handle_event(AppEvent::QueryGenerated {
            ticket: 1,
            result: Ok("coffee[tiab] AND hypertension[MeSH]".to_string()),
        });
        assert_eq!(app.status, SearchStatus::Searching);
        assert_eq!(app.active_query, "coffee[tiab] AND hypertension[MeSH]");
        assert_eq!(app.user_search, "coffee and blood pressure");
    }

    #[tokio::test]
    async fn test_summary_failure_allows_retry() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.results = vec![article("7")];

        app.handle_event(AppEvent::Summary {
            pmid: "7".to_string(),
            result: Err("AI service error".to_string()),
        });
        assert_eq!(app.summaries.get("7"), Some(&SummaryState::Failed));

        app.handle_action(AppAction::Summarize).await;
        assert_eq!(app.summaries.get("7"), Some(&SummaryState::Loading));
    }

    #[tokio::test]
    async fn test_save_toggle_persists() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.results = vec![article("42")];

        app.handle_action(AppAction::ToggleSave).await;
        assert!(app.library.is_saved("42"));
        let stored = LibraryStorage::with_path(dir.path().to_path_buf()).load().await.unwrap();
        assert!(stored.is_saved("42"));

        app.handle_action(AppAction::ToggleSave).await;
        assert!(!app.library.is_saved("42"));
        assert_eq!(app.notice.as_deref(), Some("Removed from library"));
    }

    #[tokio::test]
    async fn test_library_folder_commands() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.library.toggle_save("42", "Metformin");
        app.handle_action(AppAction::ToggleLibrary).await;
        assert_eq!(app.view, View::Library);

        // New folder
        app.handle_action(char_key('n')).await;
        for c in "Trials".chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.library.folders().len(), 2);
        assert_eq!(app.library.folders()[1].name, "Trials");

        // Move the saved article into it
        app.handle_action(AppAction::NextField).await;
        app.handle_action(char_key('m')).await;
        for c in "trials".chars() {
            app.handle_action(char_key(c)).await;
        }
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.library.folder_of("42").unwrap().name, "Trials");

        // Delete it, confirming the prompt
        app.handle_action(AppAction::PrevField).await;
        app.handle_action(AppAction::Down).await;
        app.handle_action(char_key('d')).await;
        assert!(matches!(
            app.prompt.as_ref().map(|p| &p.kind),
            Some(PromptKind::DeleteFolder { .. })
        ));
        app.handle_action(AppAction::Submit).await;
        assert_eq!(app.library.folders().len(), 1);
        assert!(!app.library.is_saved("42"));
        assert_eq!(app.folder_index, 0);
    }

    #[tokio::test]
    async fn test_default_folder_is_locked() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.view = View::Library;

        app.handle_action(char_key('d')).await;
        assert!(app.prompt.is_none());
        assert_eq!(
            app.notice.as_deref(),
            Some("The Uncategorized folder cannot be renamed or deleted")
        );
    }

    #[tokio::test]
    async fn test_move_to_unknown_folder() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.library.toggle_save("42", "Metformin");
        app.view = View::Library;
        app.library_pane = LibraryPane::Papers;

        app.handle_action(char_key('m')).await;
        app.handle_action(char_key('x')).await;
        app.handle_action(AppAction::Submit).await;

        assert_eq!(app.notice.as_deref(), Some("Folder not found: x"));
        assert_eq!(app.library.folder_of("42").unwrap().name, "Uncategorized");
    }

    #[tokio::test]
    async fn test_presets_and_history() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.handle_action(AppAction::NextPreset).await;
        assert_eq!(app.mode, SearchMode::Direct);
        assert!(app.input_text().starts_with("\"breast cancer\"[Title/Abstract]"));

        app.input = new_input(app.mode, "one");
        app.handle_action(AppAction::Submit).await;
        app.input = new_input(app.mode, "two");
        app.handle_action(AppAction::Submit).await;
        app.input = new_input(app.mode, "");

        app.handle_action(AppAction::RecallHistory).await;
        assert_eq!(app.input_text(), "two");
        app.handle_action(AppAction::RecallHistory).await;
        assert_eq!(app.input_text(), "one");
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.handle_action(AppAction::ToggleHelp).await;
        assert_eq!(app.view, View::Help);
        app.handle_action(char_key('x')).await;
        assert_eq!(app.view, View::Search);
    }
}
