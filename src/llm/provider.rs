use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AiConfig;
use crate::throttle::Throttle;
use crate::types::{AppResult, LLMRequest};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    /// Run one prompt and return the raw generated text.
    async fn create_completion(&self, request: &LLMRequest) -> AppResult<String>;
}

/// Build the adapter for the configured AI endpoint.
///
/// Every adapter shares the process-wide throttle with the PubMed client.
pub fn create_adapter(config: &AiConfig, throttle: Arc<Throttle>) -> Arc<dyn LLMAdapter> {
    Arc::new(crate::llm::pollinations::PollinationsAdapter::new(config, throttle))
}
