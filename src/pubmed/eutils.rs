//! PubMed E-utilities client
//!
//! Endpoints used:
//!   esearch: relevance-sorted id search and the free-full-text check
//!   efetch:  full PubMed XML records
//!   elink:   `neighbor_score` related articles
//!
//! All calls go through the shared [`Throttle`]. Responses are handed back
//! close to verbatim: the proxy passes them on to the client unchanged.

use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::PubMedConfig;
use crate::throttle::Throttle;
use crate::types::{AppError, AppResult};

/// How many related articles to fetch for one PMID.
pub const RELATED_LIMIT: usize = 4;

pub struct EutilsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    throttle: Arc<Throttle>,
}

impl EutilsClient {
    pub fn new(config: &PubMedConfig, throttle: Arc<Throttle>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            throttle,
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    async fn get(&self, endpoint: &str, mut params: Vec<(&'static str, String)>) -> AppResult<String> {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        self.throttle.wait().await;
        let response = self
            .client
            .get(self.endpoint(endpoint))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "E-utilities returned an error status");
            return Err(AppError::Upstream(format!("{} returned {}", endpoint, status)));
        }
        Ok(body)
    }

    async fn get_json(&self, endpoint: &str, params: Vec<(&'static str, String)>) -> AppResult<Value> {
        let body = self.get(endpoint, params).await?;
        serde_json::from_str(&body)
            .map_err(|e| AppError::Upstream(format!("{} returned malformed JSON: {}", endpoint, e)))
    }

    /// Relevance-sorted search; returns the esearch JSON document.
    #[instrument(skip(self))]
    pub async fn esearch(&self, term: &str, start: u32, max: u32) -> AppResult<Value> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", term.to_string()),
            ("retstart", start.to_string()),
            ("retmax", max.to_string()),
            ("retmode", "json".to_string()),
            ("sort", "relevance".to_string()),
        ];
        let data = self.get_json("esearch.fcgi", params).await?;
        debug!(ids = ?crate::pubmed::id_list(&data), "esearch returned PMIDs");
        Ok(data)
    }

    /// Full PubMed XML for a list of PMIDs.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn efetch(&self, ids: &[String]) -> AppResult<String> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];
        self.get("efetch.fcgi", params).await
    }

    /// Which of `ids` carry the "free full text" filter; esearch JSON.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn check_free(&self, ids: &[String]) -> AppResult<Value> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", free_full_text_term(ids)),
            ("retmode", "json".to_string()),
        ];
        self.get_json("esearch.fcgi", params).await
    }

    /// Up to [`RELATED_LIMIT`] neighbours of `pmid`, best score first.
    #[instrument(skip(self))]
    pub async fn related_ids(&self, pmid: &str) -> AppResult<Vec<String>> {
        let params = vec![
            ("dbfrom", "pubmed".to_string()),
            ("id", pmid.to_string()),
            ("retmode", "json".to_string()),
            ("cmd", "neighbor_score".to_string()),
        ];
        let data = self.get_json("elink.fcgi", params).await?;
        let ids = linked_ids(&data, RELATED_LIMIT);
        info!(count = ids.len(), "elink related articles resolved");
        Ok(ids)
    }
}

/// `(<id> OR <id> ...) AND "free full text"[filter]`
pub fn free_full_text_term(ids: &[String]) -> String {
    format!("({}) AND \"free full text\"[filter]", ids.join(" OR "))
}

/// First link set of an elink `neighbor_score` document.
fn linked_ids(data: &Value, limit: usize) -> Vec<String> {
    data["linksets"][0]["linksetdbs"][0]["links"]
        .as_array()
        .map(|links| {
            links
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    // Some elink modes return {"id": .., "score": ..} objects
                    Value::Object(o) => o.get("id").and_then(|id| id.as_str()).map(String::from),
                    _ => None,
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}
