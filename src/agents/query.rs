//! Query Agent
//!
//! Turns free text ("gout treatment", "lupus riñón") into a PubMed boolean
//! query with MeSH terms and [tiab] alternatives. One attempt, no retries.

use crate::llm::LLMAdapter;
use crate::types::{AppResult, LLMRequest};
use tracing::{info, warn};

/// Longer generated queries are treated as runaway output.
pub const MAX_QUERY_LEN: usize = 500;

const LIBRARIAN_PROMPT: &str = r#"You are an expert PubMed Medical Research Librarian specialized in creating EFFECTIVE and CONCISE queries.

CRITICAL RULES:
1. Keep queries UNDER 200 characters when possible
2. Match the SPECIFICITY of the user's search - don't add extra concepts they didn't ask for
3. Use 1-3 concept groups based on what user asks
4. Prioritize MeSH terms but include [tiab] alternatives
5. Use wildcards (*) strategically

EXAMPLES:

Input: "gout" (SINGLE DISEASE - no specific aspect)
Output: Gout[MeSH] OR gout[tiab] OR gouty arthritis[tiab]

Input: "gout complications" (DISEASE + SPECIFIC ASPECT)
Output: (Gout[MeSH] OR gout[tiab]) AND (complications[tiab] OR cardiovascular[tiab] OR renal[tiab] OR outcome*[tiab])

Input: "gout treatment"
Output: (Gout[MeSH] OR gout[tiab]) AND (drug therapy[sh] OR treatment[tiab] OR therap*[tiab])

Input: "lupus"
Output: Lupus Erythematosus, Systemic[MeSH] OR lupus[tiab] OR SLE[tiab]

Input: "lupus kidney"
Output: (Lupus Erythematosus, Systemic[MeSH] OR lupus[tiab]) AND (Kidney Diseases[MeSH] OR nephritis[tiab] OR renal[tiab])

Input: "diabetes"
Output: Diabetes Mellitus[MeSH] OR diabetes[tiab]

Input: "insulin resistance"
Output: Insulin Resistance[MeSH] OR insulin resistan*[tiab]

IMPORTANT RULES:
- If user searches ONLY a disease name → search ONLY that disease (broad search)
- If user searches disease + aspect → search disease AND that specific aspect
- TRANSLATE to English if input is in another language
- DO NOT add aspects the user didn't ask for
- Keep it simple and direct

Output ONLY the query string, no explanations."#;

pub struct QueryAgent;

impl QueryAgent {
    /// Ask the AI endpoint for a PubMed query matching `user_input`.
    pub async fn generate_query(llm: &dyn LLMAdapter, user_input: &str) -> AppResult<String> {
        info!(input_len = user_input.len(), "Generating PubMed query");

        let request = LLMRequest::new(user_input).with_system(Self::system_prompt(user_input));
        let raw = llm.create_completion(&request).await?;

        let query = Self::clean_response(&raw);
        if query.chars().count() > MAX_QUERY_LEN {
            warn!(len = query.len(), "Generated query too long, using keyword fallback");
            return Ok(Self::fallback_query(user_input));
        }

        info!(query = %query, "Query generated");
        Ok(query)
    }

    fn system_prompt(user_input: &str) -> String {
        format!("{}\n\nUser input: \"{}\"", LIBRARIAN_PROMPT, user_input)
    }

    /// Drop one leading and one trailing double quote, then trim.
    pub fn clean_response(raw: &str) -> String {
        let text = raw.strip_prefix('"').unwrap_or(raw);
        let text = text.strip_suffix('"').unwrap_or(text);
        text.trim().to_string()
    }

    /// Per-word title/abstract query from the raw input.
    ///
    /// Words of two characters or fewer are dropped. Input made only of such
    /// words is searched as a single phrase instead of producing an empty query.
    pub fn fallback_query(user_input: &str) -> String {
        let lowered = user_input.trim().to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .collect();

        if words.is_empty() {
            return format!("{}[tiab]", lowered);
        }

        words
            .iter()
            .map(|w| format!("{}[tiab]", w))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CannedLLM {
        reply: AppResult<String>,
        seen: Mutex<Vec<LLMRequest>>,
    }

    impl CannedLLM {
        fn replying(text: &str) -> Self {
            Self { reply: Ok(text.to_string()), seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl LLMAdapter for CannedLLM {
        async fn create_completion(&self, request: &LLMRequest) -> AppResult<String> {
            self.seen.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(AppError::LLMApi(e.to_string())),
            }
        }
    }

    #[test]
    fn test_clean_response() {
        assert_eq!(QueryAgent::clean_response("\"gout[tiab]\""), "gout[tiab]");
        assert_eq!(QueryAgent::clean_response("  gout[tiab]\n"), "gout[tiab]");
        assert_eq!(
            QueryAgent::clean_response("\"Gout\"[MeSH] OR \"gout\""),
            "Gout\"[MeSH] OR \"gout"
        );
    }

    #[test]
    fn test_fallback_query() {
        assert_eq!(QueryAgent::fallback_query("Gout"), "gout[tiab]");
        assert_eq!(
            QueryAgent::fallback_query("  Gout in the Kidney "),
            "gout[tiab] AND the[tiab] AND kidney[tiab]"
        );
        assert_eq!(QueryAgent::fallback_query("ab"), "ab[tiab]");
    }

    #[tokio::test]
    async fn test_generate_query_sends_input_and_prompt() {
        let llm = CannedLLM::replying("\"Diabetes Mellitus[MeSH] OR diabetes[tiab]\"");
        let query = QueryAgent::generate_query(&llm, "diabetes").await.unwrap();
        assert_eq!(query, "Diabetes Mellitus[MeSH] OR diabetes[tiab]");

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen[0].prompt, "diabetes");
        let system = seen[0].system_instruction.as_deref().unwrap();
        assert!(system.starts_with("You are an expert PubMed"));
        assert!(system.ends_with("User input: \"diabetes\""));
    }

    #[tokio::test]
    async fn test_runaway_output_falls_back() {
        let llm = CannedLLM::replying(&"x".repeat(MAX_QUERY_LEN + 1));
        let query = QueryAgent::generate_query(&llm, "gout kidney stones").await.unwrap();
        assert_eq!(query, "gout[tiab] AND kidney[tiab] AND stones[tiab]");
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let llm = CannedLLM {
            reply: Err(AppError::LLMApi("down".into())),
            seen: Mutex::new(Vec::new()),
        };
        assert!(QueryAgent::generate_query(&llm, "gout").await.is_err());
    }
}
