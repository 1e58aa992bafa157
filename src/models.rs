use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::llm::{create_adapter, LLMAdapter};
use crate::pubmed::EutilsClient;
use crate::throttle::Throttle;

/// Shared state handed to every route.
///
/// Both upstream clients hold the same [`Throttle`], so the minimum spacing
/// applies across PubMed and the AI endpoint together.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pubmed: Arc<EutilsClient>,
    pub llm: Arc<dyn LLMAdapter>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let throttle = Arc::new(Throttle::new(config.rate_limit_delay()));
        Self {
            pubmed: Arc::new(EutilsClient::new(&config.pubmed, throttle.clone())),
            llm: create_adapter(&config.ai, throttle),
            config,
        }
    }
}

// Request / response bodies. Field names are camelCase on the wire.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQueryRequest {
    pub user_input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateQueryResponse {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub start: u32,
    #[serde(default = "default_max")]
    pub max: u32,
}

fn default_max() -> u32 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdsRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub user_search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedRequest {
    pub pmid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedIdsResponse {
    pub related_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub rate_limit_delay_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_names() {
        let req: GenerateQueryRequest = serde_json::from_value(json!({ "userInput": "gout" })).unwrap();
        assert_eq!(req.user_input, "gout");

        let req: SummaryRequest = serde_json::from_value(json!({
            "title": "T", "abstract": "A", "userSearch": "gout"
        }))
        .unwrap();
        assert_eq!(req.abstract_text, "A");
        assert_eq!(req.user_search, "gout");

        let body = serde_json::to_value(RelatedIdsResponse { related_ids: vec![] }).unwrap();
        assert_eq!(body, json!({ "relatedIds": [] }));
    }

    #[test]
    fn test_search_defaults() {
        let req: SearchRequest = serde_json::from_value(json!({ "query": "gout" })).unwrap();
        assert_eq!(req.start, 0);
        assert_eq!(req.max, 10);
    }
}
