//! Keyword extraction from PubMed queries and case-insensitive highlighting.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

lazy_static! {
    static ref FIELD_TAG: Regex = Regex::new(r"\[.*?\]").unwrap();
    static ref BOOLEAN_OP: Regex = Regex::new(r"\b(AND|OR|NOT)\b").unwrap();
    static ref QUERY_PUNCT: Regex = Regex::new(r#"[()"*,]"#).unwrap();
}

/// Words worth highlighting from a query such as
/// `(Gout[MeSH] OR gout*[tiab]) AND "renal failure"`: field tags, operators and
/// punctuation dropped, words of more than three characters kept.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let clean = FIELD_TAG.replace_all(query, " ");
    let clean = BOOLEAN_OP.replace_all(&clean, " ");
    let clean = QUERY_PUNCT.replace_all(&clean, " ");

    let mut keywords: Vec<String> = Vec::new();
    for word in clean.split_whitespace() {
        if word.chars().count() > 3 && !keywords.iter().any(|k| k == word) {
            keywords.push(word.to_string());
        }
    }
    keywords
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Highlight(&'a str),
}

impl<'a> Segment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Segment::Plain(s) | Segment::Highlight(s) => s,
        }
    }
}

/// Split `text` into plain and highlighted runs.
pub fn highlight<'a>(text: &'a str, keywords: &[String]) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    if keywords.is_empty() {
        return vec![Segment::Plain(text)];
    }

    let pattern = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
        return vec![Segment::Plain(text)];
    };

    let mut segments = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() > last {
            segments.push(Segment::Plain(&text[last..m.start()]));
        }
        segments.push(Segment::Highlight(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        segments.push(Segment::Plain(&text[last..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keywords() {
        let keywords = extract_keywords(
            "(Diabetes Mellitus[MeSH] OR diabetes[tiab]) AND (insulin*[tiab] OR \"beta cell\")",
        );
        assert_eq!(keywords, vec!["Diabetes", "Mellitus", "diabetes", "insulin", "beta", "cell"]);
    }

    #[test]
    fn test_short_words_dropped() {
        assert!(extract_keywords("SLE[tiab] OR flu").is_empty());
        assert!(extract_keywords("").is_empty());
    }

    #[test]
    fn test_highlight_case_insensitive() {
        let keywords = vec!["gout".to_string()];
        let segments = highlight("Gout and tophaceous GOUT.", &keywords);
        assert_eq!(
            segments,
            vec![
                Segment::Highlight("Gout"),
                Segment::Plain(" and tophaceous "),
                Segment::Highlight("GOUT"),
                Segment::Plain("."),
            ]
        );
    }

    #[test]
    fn test_keywords_are_literal() {
        let keywords = vec!["c.elegans".to_string()];
        let segments = highlight("cxelegans and c.elegans", &keywords);
        assert_eq!(segments.iter().filter(|s| matches!(s, Segment::Highlight(_))).count(), 1);
    }

    #[test]
    fn test_no_keywords() {
        assert_eq!(highlight("text", &[]), vec![Segment::Plain("text")]);
    }
}
