//! Detail Widget
//!
//! Full record of the selected article: abstract, AI summary and related
//! articles.

use crate::pubmed::Article;
use crate::tui::app::{App, RelatedState, SummaryState};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets::results::{access_spans, highlight_spans};
use lazy_static::lazy_static;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use regex::Regex;

lazy_static! {
    static ref BLOCK_END: Regex = Regex::new(r"(?i)<br\s*/?>|</(p|li|h[1-6]|div)>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Plain text from the summary's HTML fragment, one line per block.
pub fn summary_text(html: &str) -> String {
    let text = BLOCK_END.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Theme::heading()))
}

fn hint(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("[{}]", key), Theme::shortcut_key()),
        Span::styled(format!(" {}", desc), Theme::shortcut_desc()),
    ])
}

pub fn detail_lines(
    article: &Article,
    keywords: &[String],
    summary: Option<&SummaryState>,
    related: Option<&RelatedState>,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(highlight_spans(&article.title, keywords, Theme::title())),
        Line::from(Span::styled(
            format!("{} {} {} ({})", article.author_label(), Icons::DOT, article.journal, article.year),
            Theme::text_secondary(),
        )),
        Line::from(access_spans(article)),
        Line::from(""),
        heading("Abstract"),
        Line::from(highlight_spans(&article.abstract_text, keywords, Theme::text())),
        Line::from(""),
        heading("AI Summary"),
    ];

    match summary {
        None => lines.push(hint("Ctrl+G", "Generate summary")),
        Some(SummaryState::Loading) => {
            lines.push(Line::from(Span::styled("Generating summary...", Theme::active())));
        }
        Some(SummaryState::Ready(html)) => {
            for line in summary_text(html).lines() {
                lines.push(Line::from(Span::styled(line.to_string(), Theme::text())));
            }
        }
        Some(SummaryState::Failed) => {
            lines.push(Line::from(Span::styled("Error generating summary.", Theme::error())));
            lines.push(hint("Ctrl+G", "Retry"));
        }
    }

    lines.push(Line::from(""));
    lines.push(heading("Related Articles"));
    match related {
        None => lines.push(hint("Ctrl+R", "Find related articles")),
        Some(RelatedState::Loading) => {
            lines.push(Line::from(Span::styled("Loading related articles...", Theme::active())));
        }
        Some(RelatedState::Ready(articles)) if articles.is_empty() => {
            lines.push(Line::from(Span::styled("No related articles found.", Theme::text_secondary())));
        }
        Some(RelatedState::Ready(articles)) => {
            for related in articles {
                lines.push(Line::from(vec![
                    Span::styled(format!("{} ", Icons::ARROW), Theme::text_dim()),
                    Span::styled(related.title.clone(), Theme::text()),
                ]));
                let mut access = vec![Span::raw("  ")];
                access.extend(access_spans(related));
                lines.push(Line::from(access));
            }
        }
        Some(RelatedState::Failed) => {
            lines.push(Line::from(Span::styled("Could not load related articles.", Theme::error())));
        }
    }

    lines
}

pub fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Details ")
        .borders(Borders::ALL)
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(article) = app.selected_article() else {
        return;
    };
    let lines = detail_lines(
        article,
        &app.keywords,
        app.summaries.get(&article.pmid),
        app.related.get(&article.pmid),
    );
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            pmid: "1".to_string(),
            title: "Coffee and hypertension".to_string(),
            abstract_text: "Coffee intake was not associated with hypertension.".to_string(),
            journal: "BMJ".to_string(),
            year: "2019".to_string(),
            first_author: None,
            pmc_id: None,
            is_free: true,
        }
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_summary_text_strips_html() {
        let html = "<h3>Relevance</h3><p>Directly answers the question &amp; more.</p>\
                    <ul><li>Point one</li><li>Point <b>two</b></li></ul>";
        assert_eq!(
            summary_text(html),
            "Relevance\nDirectly answers the question & more.\nPoint one\nPoint two"
        );
    }

    #[test]
    fn test_summary_states() {
        let loading = text(&detail_lines(&article(), &[], Some(&SummaryState::Loading), None));
        assert!(loading.contains("Generating summary..."));

        let failed = text(&detail_lines(&article(), &[], Some(&SummaryState::Failed), None));
        assert!(failed.contains("Error generating summary."));
        assert!(failed.contains("[Ctrl+G] Retry"));

        let ready = SummaryState::Ready("<p>Short answer.</p>".to_string());
        let ready = text(&detail_lines(&article(), &[], Some(&ready), None));
        assert!(ready.contains("Short answer."));
    }

    #[test]
    fn test_free_article_label_and_related() {
        let empty = RelatedState::Ready(Vec::new());
        let out = text(&detail_lines(&article(), &[], None, Some(&empty)));
        assert!(out.contains("Free article https://pubmed.ncbi.nlm.nih.gov/1/"));
        assert!(out.contains("Unknown Author"));
        assert!(out.contains("No related articles found."));
    }
}
