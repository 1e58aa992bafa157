//! UI Rendering
//!
//! Main layout. Everything is redrawn from [`App`] on every frame.

use crate::tui::app::{App, SearchMode, SearchStatus, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    match app.view {
        View::Library => widgets::render_library(frame, chunks[1], app),
        View::Search | View::Help => render_search(frame, chunks[1], app),
    }
    render_status_bar(frame, chunks[2], app);

    if app.view == View::Help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let badge = match app.mode {
        SearchMode::Ai => Span::styled(" AI ", Theme::badge_ai()),
        SearchMode::Direct => Span::styled(" PubMed ", Theme::badge_direct()),
    };

    let title = Paragraph::new(Line::from(vec![
        Span::styled("PubMed", Theme::title()),
        Span::styled(" AI Search  ", Theme::text_secondary()),
        badge,
        Span::styled(
            format!("  {} {} saved", Icons::SAVED, app.library.total_saved()),
            Theme::text_secondary(),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border()),
    );

    frame.render_widget(title, area);
}

fn render_search(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input
            Constraint::Length(1), // Filters
            Constraint::Min(5),    // Results + details
        ])
        .split(area);

    render_input(frame, chunks[0], app);
    render_filters(frame, chunks[1], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    widgets::render_results(frame, body[0], app);
    widgets::render_detail(frame, body[1], app);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.mode {
        SearchMode::Ai => " Ask in plain language ",
        SearchMode::Direct => " PubMed query ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if app.view == View::Search {
            Theme::border_focused()
        } else {
            Theme::border()
        });

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

fn render_filters(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        Span::styled(" Filters: ", Theme::text_dim()),
        Span::styled(app.filters.summary(), Theme::text_secondary()),
    ];
    if !app.active_query.is_empty() {
        spans.push(Span::styled("  Query: ", Theme::text_dim()));
        spans.push(Span::styled(app.active_query.clone(), Theme::placeholder()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn shortcut(key: &str, desc: &str) -> [Span<'static>; 2] {
    [
        Span::styled(format!("[{}]", key), Theme::shortcut_key()),
        Span::styled(format!(" {} ", desc), Theme::shortcut_desc()),
    ]
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let spinner = Icons::SPINNER[(app.tick % Icons::SPINNER.len() as u64) as usize];

    let line = if let Some(prompt) = &app.prompt {
        Line::from(vec![
            Span::styled(format!(" {}: ", prompt.kind.label()), Theme::active()),
            Span::styled(format!("{}▌", prompt.input), Theme::text()),
        ])
    } else {
        let status = if let Some(notice) = &app.notice {
            Span::styled(notice.clone(), Theme::success())
        } else {
            match &app.status {
                SearchStatus::GeneratingQuery => {
                    Span::styled(format!("{} Generating query", spinner), Theme::active())
                }
                SearchStatus::Searching => Span::styled(format!("{} Searching", spinner), Theme::active()),
                SearchStatus::Results if app.paginator.is_loading() => {
                    Span::styled(format!("{} Loading more", spinner), Theme::active())
                }
                SearchStatus::Results => Span::styled(
                    format!("{} articles", app.results.len()),
                    Theme::text_secondary(),
                ),
                SearchStatus::NoResults => Span::styled("No results", Theme::text_secondary()),
                SearchStatus::Error(_) => Span::styled("Error", Theme::error()),
                SearchStatus::Idle => Span::styled("Ready", Theme::text_secondary()),
            }
        };

        let shortcuts = match app.view {
            View::Library => [
                shortcut("n", "New"),
                shortcut("r", "Rename"),
                shortcut("d", "Delete"),
                shortcut("m", "Move"),
                shortcut("Esc", "Back"),
            ]
            .concat(),
            _ => [
                shortcut("Enter", "Search"),
                shortcut("Tab", "Mode"),
                shortcut("Ctrl+S", "Save"),
                shortcut("Ctrl+L", "Library"),
                shortcut("F1", "Help"),
            ]
            .concat(),
        };

        Line::from(
            std::iter::once(Span::raw(" "))
                .chain(std::iter::once(status))
                .chain(std::iter::once(Span::raw(" │ ")))
                .chain(shortcuts)
                .collect::<Vec<_>>(),
        )
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn help_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<13}", key), Theme::shortcut_key()),
        Span::styled(desc.to_string(), Theme::text()),
    ])
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let help_lines = vec![
        Line::from(Span::styled("Search", Theme::heading())),
        help_line("Enter", "Run search"),
        help_line("Tab", "Switch AI / PubMed query mode"),
        help_line("↑/↓ PgUp/Dn", "Select article (more load near the end)"),
        help_line("Ctrl+S", "Save / unsave selected article"),
        help_line("Ctrl+G", "AI summary of selected article (retry)"),
        help_line("Ctrl+R", "Related articles"),
        help_line("F2", "Next example search"),
        help_line("F7", "Recall earlier searches"),
        Line::from(""),
        Line::from(Span::styled("Filters", Theme::heading())),
        help_line("Ctrl+F", "Free full text"),
        help_line("Ctrl+D", "Publication date: 1 / 5 / 10 years"),
        help_line("Ctrl+E", "Reviews and meta-analyses only"),
        help_line("Ctrl+A", "Associated data"),
        help_line("Ctrl+P", "Exclude preprints"),
        help_line("F3 F4 F5 F6", "Article type, species, language, age"),
        Line::from(""),
        Line::from(Span::styled("Library (Ctrl+L)", Theme::heading())),
        help_line("Tab", "Switch folders / articles"),
        help_line("n", "New folder"),
        help_line("r", "Rename folder or article"),
        help_line("d", "Delete folder or remove article"),
        help_line("m", "Move article to folder"),
        Line::from(""),
        help_line("Ctrl+Q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ];

    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border_focused()),
    );

    frame.render_widget(paragraph, area);
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::ApiClient;
    use crate::library::{Library, LibraryStorage};
    use crate::pubmed::Article;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tempfile::TempDir;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn test_app(dir: &TempDir) -> App {
        App::new(
            ApiClient::new("http://127.0.0.1:9"),
            LibraryStorage::with_path(dir.path().to_path_buf()),
            Library::default(),
        )
    }

    #[test]
    fn test_no_results_screen() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.status = SearchStatus::NoResults;

        assert!(screen(&app).contains("No results found."));
    }

    #[test]
    fn test_results_screen() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.status = SearchStatus::Results;
        app.results = vec![Article {
            pmid: "12345".to_string(),
            title: "Diabetes outcomes".to_string(),
            abstract_text: "Results.".to_string(),
            journal: "Lancet".to_string(),
            year: "2022".to_string(),
            first_author: Some("Lee".to_string()),
            pmc_id: Some("PMC555".to_string()),
            is_free: true,
        }];

        let out = screen(&app);
        assert!(out.contains("Results (1)"));
        assert!(out.contains("Free PMC article"));
        assert!(out.contains("Lee et al."));
        assert!(out.contains("[Ctrl+G] Generate summary"));
    }

    #[test]
    fn test_library_and_help_screens() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        app.view = View::Library;
        assert!(screen(&app).contains("Uncategorized (0)"));

        app.view = View::Help;
        assert!(screen(&app).contains("Press any key to close"));
    }
}
