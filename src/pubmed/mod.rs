//! PubMed E-utilities
//!
//! - [`EutilsClient`]: throttled esearch / efetch / elink calls used by the proxy
//! - [`Article`] and [`parse_articles`]: efetch XML → search result records

pub mod article;
pub mod eutils;

pub use article::{parse_articles, Article};
pub use eutils::{free_full_text_term, EutilsClient, RELATED_LIMIT};

pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Pull `esearchresult.idlist` out of an esearch JSON document.
///
/// Missing or malformed lists read as empty, which is how an exhausted search
/// looks to the client.
pub fn id_list(esearch: &serde_json::Value) -> Vec<String> {
    esearch["esearchresult"]["idlist"]
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) => Some(s.clone()),
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
