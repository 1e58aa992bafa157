//! Summary Agent
//!
//! Short HTML relevance summary of one article relative to what the user
//! searched for. The output is a fragment (`<p>` blocks), not a document.

use crate::llm::LLMAdapter;
use crate::types::{AppResult, LLMRequest};
use tracing::info;

/// Abstract characters forwarded to the model.
pub const ABSTRACT_LIMIT: usize = 1800;

pub struct SummaryAgent;

impl SummaryAgent {
    pub async fn summarize(
        llm: &dyn LLMAdapter,
        title: &str,
        abstract_text: &str,
        user_search: &str,
    ) -> AppResult<String> {
        info!(title = %title, "Generating article summary");

        let prompt = Self::create_prompt(title, abstract_text, user_search);
        let raw = llm.create_completion(&LLMRequest::new(prompt)).await?;
        let summary = Self::strip_fences(&raw);

        info!(summary_len = summary.len(), "Summary generated");
        Ok(summary)
    }

    fn create_prompt(title: &str, abstract_text: &str, user_search: &str) -> String {
        let truncated: String = abstract_text.chars().take(ABSTRACT_LIMIT).collect();
        format!(
            r#"You are a medical analyst. Generate a SHORT summary in ENGLISH (max 10-15 lines).

USER SEARCH: "{user_search}"

ARTICLE:
Title: "{title}"
Abstract: "{truncated}"

INSTRUCTIONS:
1. Summarize the article in max 10-15 lines.
2. IMPORTANT: Clearly indicate if the article talks DIRECTLY about what the user is searching for.
3. If it does, explain WHAT it says specifically.
4. If it does NOT, indicate what it is actually about.

FORMAT (max 15 lines):

<p><strong>Relevance:</strong> [YES, talks about X / NO directly, talks about Y]</p>

<p><strong>Summary:</strong> [2-3 lines of main content]</p>

Be HONEST about relevance."#
        )
    }

    /// Remove every ```` ```html ```` and ```` ``` ```` marker.
    pub fn strip_fences(text: &str) -> String {
        text.replace("```html", "").replace("```", "")
    }
}
