//! HTTP client for the proxy API
//!
//! Used by the terminal client. Implements [`SearchBackend`] so pagination
//! can run against a live proxy.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::models::{GenerateQueryResponse, SummaryResponse};
use crate::pubmed::{id_list, parse_articles, Article};
use crate::search::SearchBackend;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid PubMed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Error bodies are `{ "error": "..." }`; fall back to the raw text.
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["error"].as_str().map(String::from))
            .unwrap_or(text);
        Err(ClientError::Server { status: status.as_u16(), message })
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        let text = self.post(path, body).await?.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn generate_query(&self, user_input: &str) -> Result<String, ClientError> {
        let text = self
            .post("/api/generate-query", &json!({ "userInput": user_input }))
            .await?
            .text()
            .await?;
        let response: GenerateQueryResponse = serde_json::from_str(&text)?;
        Ok(response.query)
    }

    pub async fn summarize(&self, title: &str, abstract_text: &str, user_search: &str) -> Result<String, ClientError> {
        let body = json!({ "title": title, "abstract": abstract_text, "userSearch": user_search });
        let text = self.post("/api/generate-summary", &body).await?.text().await?;
        let response: SummaryResponse = serde_json::from_str(&text)?;
        Ok(response.summary)
    }

    /// Related articles; empty when PubMed knows none.
    pub async fn related_papers(&self, pmid: &str) -> Result<Vec<Article>, ClientError> {
        let response = self.post("/api/related-papers", &json!({ "pmid": pmid })).await?;
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let text = response.text().await?;
        if is_json {
            // `{ "relatedIds": [] }`
            return Ok(Vec::new());
        }
        Ok(parse_articles(&text)?)
    }
}

#[async_trait]
impl SearchBackend for ApiClient {
    async fn search_ids(&self, query: &str, start: u32, max: u32) -> Result<Vec<String>, ClientError> {
        let data = self
            .post_json("/api/search", &json!({ "query": query, "start": start, "max": max }))
            .await?;
        Ok(id_list(&data))
    }

    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, ClientError> {
        let xml = self
            .post("/api/fetch-papers", &json!({ "ids": ids }))
            .await?
            .text()
            .await?;
        Ok(parse_articles(&xml)?)
    }

    async fn free_ids(&self, ids: &[String]) -> Result<Vec<String>, ClientError> {
        let data = self.post_json("/api/check-free", &json!({ "ids": ids })).await?;
        Ok(id_list(&data))
    }
}
