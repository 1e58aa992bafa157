//! Search result records parsed from efetch XML.
//!
//! Field selection takes the first match inside each `<PubmedArticle>`, in
//! document order, the same way a CSS selector over the record would:
//! `PMID`, `ArticleTitle`, `AbstractText`, `ISOAbbreviation`, `PubDate Year`,
//! `Author LastName` and `ArticleId[IdType="pmc"]`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";
pub const NO_ABSTRACT: &str = "Abstract not available.";
pub const NO_JOURNAL: &str = "Journal";
pub const NO_YEAR: &str = "N/A";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    pub journal: String,
    pub year: String,
    pub first_author: Option<String>,
    pub pmc_id: Option<String>,
    pub is_free: bool,
}

impl Article {
    /// `"<Last> et al."` or [`UNKNOWN_AUTHOR`].
    pub fn author_label(&self) -> String {
        match &self.first_author {
            Some(last) => format!("{} et al.", last),
            None => UNKNOWN_AUTHOR.to_string(),
        }
    }

    pub fn pubmed_url(&self) -> String {
        format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.pmid)
    }

    pub fn pmc_url(&self) -> Option<String> {
        self.pmc_id
            .as_ref()
            .map(|pmc| format!("https://www.ncbi.nlm.nih.gov/pmc/articles/{}/", pmc))
    }

    /// Label shown next to free articles; PMC availability wins.
    pub fn free_label(&self) -> Option<&'static str> {
        if self.pmc_id.is_some() {
            Some("Free PMC article")
        } else if self.is_free {
            Some("Free article")
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Pmid,
    Title,
    Abstract,
    Journal,
    Year,
    Author,
    Pmc,
}

/// Accumulates the first value of each field for one `<PubmedArticle>`.
#[derive(Default)]
struct Draft {
    pmid: Option<String>,
    title: Option<String>,
    abstract_text: Option<String>,
    journal: Option<String>,
    year: Option<String>,
    first_author: Option<String>,
    pmc_id: Option<String>,
}

impl Draft {
    fn has(&self, field: Field) -> bool {
        match field {
            Field::Pmid => self.pmid.is_some(),
            Field::Title => self.title.is_some(),
            Field::Abstract => self.abstract_text.is_some(),
            Field::Journal => self.journal.is_some(),
            Field::Year => self.year.is_some(),
            Field::Author => self.first_author.is_some(),
            Field::Pmc => self.pmc_id.is_some(),
        }
    }

    fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Pmid => &mut self.pmid,
            Field::Title => &mut self.title,
            Field::Abstract => &mut self.abstract_text,
            Field::Journal => &mut self.journal,
            Field::Year => &mut self.year,
            Field::Author => &mut self.first_author,
            Field::Pmc => &mut self.pmc_id,
        };
        *slot = Some(text);
    }

    fn finish(self) -> Article {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let pmc_id = non_empty(self.pmc_id);
        Article {
            pmid: self.pmid.unwrap_or_default(),
            title: non_empty(self.title).unwrap_or_else(|| UNTITLED.to_string()),
            abstract_text: non_empty(self.abstract_text).unwrap_or_else(|| NO_ABSTRACT.to_string()),
            journal: non_empty(self.journal).unwrap_or_else(|| NO_JOURNAL.to_string()),
            year: non_empty(self.year).unwrap_or_else(|| NO_YEAR.to_string()),
            first_author: self.first_author,
            is_free: pmc_id.is_some(),
            pmc_id,
        }
    }
}

fn is_pmc_id(e: &BytesStart) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.as_ref() == b"IdType" && attr.value.as_ref() == b"pmc"
    })
}

/// Which field, if any, an opening tag starts capturing given its ancestors.
fn field_for(name: &[u8], stack: &[Vec<u8>], e: &BytesStart) -> Option<Field> {
    let inside = |ancestor: &[u8]| stack.iter().any(|s| s.as_slice() == ancestor);
    match name {
        b"PMID" => Some(Field::Pmid),
        b"ArticleTitle" => Some(Field::Title),
        b"AbstractText" => Some(Field::Abstract),
        b"ISOAbbreviation" => Some(Field::Journal),
        b"Year" if inside(b"PubDate") => Some(Field::Year),
        b"LastName" if inside(b"Author") => Some(Field::Author),
        b"ArticleId" if is_pmc_id(e) => Some(Field::Pmc),
        _ => None,
    }
}

/// Parse every `<PubmedArticle>` in an efetch document.
///
/// Free status starts out as "has a PMC id"; merging the free-full-text id
/// list happens later, once that response is in.
pub fn parse_articles(xml: &str) -> Result<Vec<Article>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    // Titles keep inner whitespace around inline markup such as <i>.
    reader.config_mut().trim_text(false);

    let mut articles = Vec::new();
    let mut current: Option<Draft> = None;
    let mut stack: Vec<Vec<u8>> = Vec::new();
    // (field, depth at which it was opened, text so far)
    let mut capture: Option<(Field, usize, String)> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = e.name().as_ref().to_vec();
                if name.as_slice() == b"PubmedArticle" {
                    current = Some(Draft::default());
                    stack.clear();
                } else if let (Some(draft), None) = (current.as_ref(), capture.as_ref()) {
                    if let Some(field) = field_for(&name, &stack, e) {
                        if !draft.has(field) {
                            capture = Some((field, stack.len(), String::new()));
                        }
                    }
                }
                stack.push(name);
            }
            Event::Text(ref e) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(ref e) => {
                if let Some((_, _, text)) = capture.as_mut() {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::End(ref e) => {
                if e.name().as_ref() == b"PubmedArticle" {
                    if let Some(draft) = current.take() {
                        articles.push(draft.finish());
                    }
                    capture = None;
                    stack.clear();
                } else {
                    stack.pop();
                    let closes_capture = matches!(&capture, Some((_, depth, _)) if *depth == stack.len());
                    if closes_capture {
                        if let (Some((field, _, text)), Some(draft)) = (capture.take(), current.as_mut()) {
                            draft.set(field, text.trim().to_string());
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE">
      <PMID Version="1">12345</PMID>
      <Article>
        <Journal>
          <JournalIssue>
            <PubDate><Year>2021</Year><Month>Mar</Month></PubDate>
          </JournalIssue>
          <ISOAbbreviation>Diabetes Care</ISOAbbreviation>
        </Journal>
        <ArticleTitle>Metformin and <i>HbA1c</i> &amp; outcomes</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">First part.</AbstractText>
          <AbstractText Label="RESULTS">Second part.</AbstractText>
        </Abstract>
        <AuthorList>
          <Author><LastName>Smith</LastName><ForeName>Jane</ForeName></Author>
          <Author><LastName>Doe</LastName></Author>
        </AuthorList>
      </Article>
      <CommentsCorrectionsList>
        <CommentsCorrections><PMID Version="1">99999</PMID></CommentsCorrections>
      </CommentsCorrectionsList>
    </MedlineCitation>
    <PubmedData>
      <ArticleIdList>
        <ArticleId IdType="pubmed">12345</ArticleId>
        <ArticleId IdType="pmc">PMC777</ArticleId>
      </ArticleIdList>
    </PubmedData>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID>67890</PMID>
      <Article>
        <Journal><JournalIssue><PubDate><MedlineDate>2019 Winter</MedlineDate></PubDate></JournalIssue></Journal>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn test_parse_full_record() {
        let articles = parse_articles(SAMPLE).unwrap();
        assert_eq!(articles.len(), 2);

        let first = &articles[0];
        assert_eq!(first.pmid, "12345");
        assert_eq!(first.title, "Metformin and HbA1c & outcomes");
        assert_eq!(first.abstract_text, "First part.");
        assert_eq!(first.journal, "Diabetes Care");
        assert_eq!(first.year, "2021");
        assert_eq!(first.author_label(), "Smith et al.");
        assert_eq!(first.pmc_id.as_deref(), Some("PMC777"));
        assert!(first.is_free);
        assert_eq!(first.free_label(), Some("Free PMC article"));
        assert_eq!(
            first.pmc_url().as_deref(),
            Some("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC777/")
        );
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let articles = parse_articles(SAMPLE).unwrap();
        let sparse = &articles[1];
        assert_eq!(sparse.pmid, "67890");
        assert_eq!(sparse.title, UNTITLED);
        assert_eq!(sparse.abstract_text, NO_ABSTRACT);
        assert_eq!(sparse.journal, NO_JOURNAL);
        assert_eq!(sparse.year, NO_YEAR);
        assert_eq!(sparse.author_label(), UNKNOWN_AUTHOR);
        assert!(!sparse.is_free);
        assert_eq!(sparse.free_label(), None);
    }

    #[test]
    fn test_free_without_pmc() {
        let mut article = parse_articles(SAMPLE).unwrap().remove(1);
        article.is_free = true;
        assert_eq!(article.free_label(), Some("Free article"));
        assert_eq!(article.pmc_url(), None);
        assert_eq!(article.pubmed_url(), "https://pubmed.ncbi.nlm.nih.gov/67890/");
    }

    #[test]
    fn test_empty_set() {
        assert!(parse_articles("<PubmedArticleSet></PubmedArticleSet>").unwrap().is_empty());
    }
}
