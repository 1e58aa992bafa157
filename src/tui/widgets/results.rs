//! Results Widget
//!
//! The list of loaded articles, with keyword highlighting, free-access labels
//! and links.

use crate::pubmed::Article;
use crate::search::highlight;
use crate::search::Segment;
use crate::tui::app::{App, SearchStatus, View};
use crate::tui::theme::{Icons, Theme};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Lines per article in the list, spacing included.
pub const ITEM_HEIGHT: u16 = 4;

/// `text` as spans, keyword matches in the highlight style.
pub fn highlight_spans(text: &str, keywords: &[String], base: Style) -> Vec<Span<'static>> {
    highlight(text, keywords)
        .into_iter()
        .map(|segment| match segment {
            Segment::Plain(s) => Span::styled(s.to_string(), base),
            Segment::Highlight(s) => Span::styled(s.to_string(), Theme::highlight()),
        })
        .collect()
}

/// Access label and the best link: the PMC copy when there is one.
pub fn access_spans(article: &Article) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    if let Some(label) = article.free_label() {
        spans.push(Span::styled(label, Theme::free_badge()));
        spans.push(Span::raw(" "));
    }
    let url = article.pmc_url().unwrap_or_else(|| article.pubmed_url());
    spans.push(Span::styled(url, Theme::link()));
    spans
}

pub fn article_lines(article: &Article, keywords: &[String], selected: bool, saved: bool) -> Vec<Line<'static>> {
    let marker = if selected {
        Span::styled(format!("{} ", Icons::SELECTED), Theme::selected())
    } else {
        Span::raw("  ")
    };
    let star = if saved {
        Span::styled(format!("{} ", Icons::SAVED), Theme::active())
    } else {
        Span::styled(format!("{} ", Icons::UNSAVED), Theme::text_dim())
    };

    let mut title = vec![marker, star];
    title.extend(highlight_spans(&article.title, keywords, Theme::article_title()));

    let meta = Line::from(vec![
        Span::raw("    "),
        Span::styled(
            format!(
                "{} {} {} {} {}",
                article.author_label(),
                Icons::DOT,
                article.journal,
                Icons::DOT,
                article.year
            ),
            Theme::text_secondary(),
        ),
    ]);

    let mut access = vec![
        Span::raw("    "),
        Span::styled(format!("PMID {} ", article.pmid), Theme::text_dim()),
    ];
    access.extend(access_spans(article));

    vec![Line::from(title), meta, Line::from(access), Line::from("")]
}

fn message(text: &str, style: Style) -> Vec<Line<'static>> {
    vec![Line::from(""), Line::from(Span::styled(text.to_string(), style))]
}

pub fn render_results(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.results.is_empty() {
        " Results ".to_string()
    } else {
        format!(" Results ({}) ", app.results.len())
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

    let lines = match &app.status {
        SearchStatus::Idle => message(
            "Type a question and press Enter. Tab switches between AI and PubMed query mode, F2 loads an example.",
            Theme::text_secondary(),
        ),
        SearchStatus::GeneratingQuery => message("Generating search query...", Theme::active()),
        SearchStatus::Searching if app.results.is_empty() => {
            message("Searching PubMed...", Theme::active())
        }
        SearchStatus::NoResults => message("No results found.", Theme::text_secondary()),
        SearchStatus::Error(detail) => {
            let mut lines = message(
                "Something went wrong while searching. Please try again.",
                Theme::error(),
            );
            lines.push(Line::from(Span::styled(detail.clone(), Theme::text_dim())));
            lines
        }
        _ => {
            let mut lines = Vec::new();
            for (i, article) in app.results.iter().enumerate() {
                lines.extend(article_lines(
                    article,
                    &app.keywords,
                    i == app.selected,
                    app.library.is_saved(&article.pmid),
                ));
            }
            if app.paginator.is_loading() {
                lines.push(Line::from(Span::styled("Loading more...", Theme::active())));
            } else if app.paginator.is_exhausted() {
                lines.push(Line::from(Span::styled("End of results", Theme::text_dim())));
            }

            let bottom = (app.selected as u16).saturating_add(1).saturating_mul(ITEM_HEIGHT);
            let scroll = bottom.saturating_sub(inner.height);
            frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
            return;
        }
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}
