// Adapter for the Pollinations text endpoint
//
// The endpoint is a plain GET: the prompt travels as the last path segment
// and the system prompt, model and key as query parameters. The body of a
// successful response is the generated text, not JSON.

use crate::config::AiConfig;
use crate::llm::provider::LLMAdapter;
use crate::throttle::Throttle;
use crate::types::{AppError, AppResult, LLMRequest};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct PollinationsAdapter {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    throttle: Arc<Throttle>,
}

impl PollinationsAdapter {
    pub fn new(config: &AiConfig, throttle: Arc<Throttle>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            throttle,
        }
    }

    fn build_url(&self, request: &LLMRequest) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("Invalid AI base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| AppError::Internal("AI base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("text")
            .push(&request.prompt);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("model", &self.model);
            if let Some(system) = &request.system_instruction {
                query.append_pair("system", system);
            }
            query.append_pair("key", &self.api_key);
        }

        Ok(url)
    }
}

#[async_trait]
impl LLMAdapter for PollinationsAdapter {
    async fn create_completion(&self, request: &LLMRequest) -> AppResult<String> {
        let url = self.build_url(request)?;

        self.throttle.wait().await;
        debug!(model = %self.model, prompt_len = request.prompt.len(), "Calling AI text endpoint");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "AI text endpoint returned an error status");
            return Err(AppError::LLMApi(format!("upstream returned {}", status)));
        }

        Ok(response.text().await?)
    }
}
