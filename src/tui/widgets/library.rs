//! Library Widget
//!
//! Folders on the left, the selected folder's saved articles on the right.

use crate::library::{Folder, Library};
use crate::tui::app::{App, LibraryPane};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn folder_lines(library: &Library, selected: usize) -> Vec<Line<'static>> {
    library
        .folders()
        .iter()
        .enumerate()
        .map(|(i, folder)| {
            let style = if i == selected { Theme::selected() } else { Theme::text() };
            let marker = if i == selected { Icons::SELECTED } else { Icons::FOLDER };
            Line::from(vec![
                Span::styled(format!("{} {}", marker, folder.name), style),
                Span::styled(format!(" ({})", folder.papers.len()), Theme::text_dim()),
            ])
        })
        .collect()
}

pub fn paper_lines(folder: &Folder, selected: Option<usize>) -> Vec<Line<'static>> {
    if folder.papers.is_empty() {
        return vec![Line::from(Span::styled(
            "No saved articles. Press Ctrl+S on a search result to save it.",
            Theme::text_secondary(),
        ))];
    }

    let mut lines = Vec::new();
    for (i, paper) in folder.papers.iter().enumerate() {
        let is_selected = selected == Some(i);
        let marker = if is_selected {
            Span::styled(format!("{} ", Icons::SELECTED), Theme::selected())
        } else {
            Span::raw("  ")
        };
        let title_style = if is_selected { Theme::selected() } else { Theme::article_title() };

        lines.push(Line::from(vec![marker, Span::styled(paper.title.clone(), title_style)]));
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                format!(
                    "PMID {} {} saved {} ",
                    paper.pmid,
                    Icons::DOT,
                    paper.saved_at.format("%Y-%m-%d")
                ),
                Theme::text_dim(),
            ),
            Span::styled(
                format!("https://pubmed.ncbi.nlm.nih.gov/{}/", paper.pmid),
                Theme::link(),
            ),
        ]));
        lines.push(Line::from(""));
    }
    lines
}

pub fn render_library(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);

    let focused = |pane: LibraryPane| {
        if app.library_pane == pane {
            Theme::border_focused()
        } else {
            Theme::border()
        }
    };

    let folders = Block::default()
        .title(format!(" Folders ({} saved) ", app.library.total_saved()))
        .borders(Borders::ALL)
        .border_style(focused(LibraryPane::Folders));
    frame.render_widget(
        Paragraph::new(folder_lines(&app.library, app.folder_index)).block(folders),
        chunks[0],
    );

    let folder = app.library.folders().get(app.folder_index);
    let papers = Block::default()
        .title(format!(" {} ", folder.map_or("Articles", |f| f.name.as_str())))
        .borders(Borders::ALL)
        .border_style(focused(LibraryPane::Papers));
    let inner = papers.inner(chunks[1]);
    frame.render_widget(papers, chunks[1]);

    if let Some(folder) = folder {
        let selected = (app.library_pane == LibraryPane::Papers).then_some(app.paper_index);
        let scroll = (app.paper_index as u16)
            .saturating_add(1)
            .saturating_mul(3)
            .saturating_sub(inner.height);
        frame.render_widget(
            Paragraph::new(paper_lines(folder, selected)).scroll((scroll, 0)),
            inner,
        );
    }
}
