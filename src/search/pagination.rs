//! Infinite-scroll pagination over PubMed results.
//!
//! [`Paginator`] holds the cursor state; [`run_batch`] performs the three
//! requests of one batch. They are split so a UI can start a batch, hand the
//! request to a background task and apply the result when it comes back.
//!
//! A batch is:
//! 1. search ids at `start = offset`, `max = BATCH_SIZE`
//! 2. in parallel: fetch the records, ask which ids are free full text
//! 3. merge free status into the parsed articles

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api_client::ClientError;
use crate::pubmed::Article;

pub const BATCH_SIZE: u32 = 10;

/// Queries longer than this are cut before being sent.
pub const MAX_QUERY_CHARS: usize = 1000;

/// The three calls a batch needs. Implemented by the HTTP client against the
/// proxy and by in-memory fakes in tests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_ids(&self, query: &str, start: u32, max: u32) -> Result<Vec<String>, ClientError>;
    async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, ClientError>;
    async fn free_ids(&self, ids: &[String]) -> Result<Vec<String>, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub query: String,
    pub start: u32,
    pub max: u32,
    /// Query generation this request belongs to
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Articles(Vec<Article>),
    /// The search returned no ids: nothing more for this query.
    Exhausted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub generation: u64,
    pub start: u32,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    query: String,
    batch_size: u32,
    offset: u32,
    exhausted: bool,
    loading: bool,
    generation: u64,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}

impl Paginator {
    pub fn new(batch_size: u32) -> Self {
        Self {
            query: String::new(),
            batch_size,
            offset: 0,
            exhausted: false,
            loading: false,
            generation: 0,
        }
    }

    /// Start over with a new query. Results of batches begun before the reset
    /// are ignored by [`finish`](Self::finish).
    pub fn reset(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.offset = 0;
        self.exhausted = false;
        self.loading = false;
        self.generation += 1;
    }

    /// Claim the next batch, or `None` while one is in flight, once the query
    /// is exhausted, or before any query was set.
    pub fn try_begin(&mut self) -> Option<BatchRequest> {
        if self.loading || self.exhausted || self.query.is_empty() {
            return None;
        }
        self.loading = true;

        Some(BatchRequest {
            query: truncate_query(&self.query),
            start: self.offset,
            max: self.batch_size,
            generation: self.generation,
        })
    }

    /// Apply a finished batch. Returns `false` for a stale result, which
    /// leaves the state untouched.
    pub fn finish(&mut self, result: &BatchResult) -> bool {
        if result.generation != self.generation {
            debug!(stale = result.generation, current = self.generation, "Dropping stale batch");
            return false;
        }
        self.loading = false;

        match &result.outcome {
            BatchOutcome::Articles(_) => self.offset += self.batch_size,
            BatchOutcome::Exhausted => self.exhausted = true,
            BatchOutcome::Failed(_) => {}
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn truncate_query(query: &str) -> String {
    query.chars().take(MAX_QUERY_CHARS).collect()
}

/// Mark every article that has a PMC id or is listed in `free_ids`.
pub fn merge_free_status(articles: &mut [Article], free_ids: &[String]) {
    for article in articles.iter_mut() {
        article.is_free = article.pmc_id.is_some() || free_ids.iter().any(|id| *id == article.pmid);
    }
}

/// Run the requests of one batch. Never fails; errors become
/// [`BatchOutcome::Failed`].
pub async fn run_batch<B: SearchBackend + ?Sized>(backend: &B, request: &BatchRequest) -> BatchResult {
    let outcome = match fetch_batch(backend, request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(start = request.start, error = %e, "Batch failed");
            BatchOutcome::Failed(e.to_string())
        }
    };

    BatchResult {
        generation: request.generation,
        start: request.start,
        outcome,
    }
}

async fn fetch_batch<B: SearchBackend + ?Sized>(
    backend: &B,
    request: &BatchRequest,
) -> Result<BatchOutcome, ClientError> {
    let ids = backend.search_ids(&request.query, request.start, request.max).await?;
    if ids.is_empty() {
        info!(start = request.start, "No more results");
        return Ok(BatchOutcome::Exhausted);
    }

    let (articles, free_ids) = futures::join!(backend.fetch_articles(&ids), backend.free_ids(&ids));
    let mut articles = articles?;
    // Without the check, only PMC-backed articles count as free
    let free_ids = free_ids.unwrap_or_else(|e| {
        warn!(start = request.start, error = %e, "Free full text check failed");
        Vec::new()
    });

    if articles.is_empty() {
        return Ok(BatchOutcome::Failed("no articles in PubMed response".to_string()));
    }

    merge_free_status(&mut articles, &free_ids);
    info!(start = request.start, count = articles.len(), free = free_ids.len(), "Batch loaded");
    Ok(BatchOutcome::Articles(articles))
}

/// Claim, run and apply the next batch in one go. `None` when no batch was
/// due (one already in flight, or the query is exhausted).
pub async fn load_next_batch<B: SearchBackend + ?Sized>(
    paginator: &mut Paginator,
    backend: &B,
) -> Option<BatchResult> {
    let request = paginator.try_begin()?;
    let result = run_batch(backend, &request).await;
    paginator.finish(&result);
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn article(pmid: &str, pmc: Option<&str>) -> Article {
        Article {
            pmid: pmid.to_string(),
            title: format!("Paper {}", pmid),
            abstract_text: String::new(),
            journal: "J".to_string(),
            year: "2024".to_string(),
            first_author: None,
            pmc_id: pmc.map(String::from),
            is_free: pmc.is_some(),
        }
    }

    /// `total` results, ids "1".."total"; odd ids carry a PMC id.
    struct FakeBackend {
        total: u32,
        free: Vec<String>,
        searches: Mutex<Vec<(String, u32, u32)>>,
        fail_fetch: bool,
        fail_free: bool,
    }

    impl FakeBackend {
        fn new(total: u32) -> Self {
            Self { total, free: Vec::new(), searches: Mutex::new(Vec::new()), fail_fetch: false, fail_free: false }
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn search_ids(&self, query: &str, start: u32, max: u32) -> Result<Vec<String>, ClientError> {
            self.searches.lock().unwrap().push((query.to_string(), start, max));
            Ok((start + 1..=(start + max).min(self.total)).map(|i| i.to_string()).collect())
        }

        async fn fetch_articles(&self, ids: &[String]) -> Result<Vec<Article>, ClientError> {
            if self.fail_fetch {
                return Err(ClientError::Server { status: 500, message: "boom".into() });
            }
            Ok(ids
                .iter()
                .map(|id| {
                    let odd = id.parse::<u32>().map(|n| n % 2 == 1).unwrap_or(false);
                    article(id, odd.then(|| "PMC1"))
                })
                .collect())
        }

        async fn free_ids(&self, _ids: &[String]) -> Result<Vec<String>, ClientError> {
            if self.fail_free {
                return Err(ClientError::Server { status: 500, message: "esearch.fcgi returned 429".into() });
            }
            Ok(self.free.clone())
        }
    }

    #[tokio::test]
    async fn test_offset_advances_per_batch_until_exhausted() {
        let backend = FakeBackend::new(25);
        let mut paginator = Paginator::default();
        paginator.reset("gout");

        let mut sizes = Vec::new();
        while let Some(result) = load_next_batch(&mut paginator, &backend).await {
            if let BatchOutcome::Articles(articles) = &result.outcome {
                sizes.push(articles.len());
            }
        }

        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(paginator.offset(), 30);
        assert!(paginator.is_exhausted());

        let starts: Vec<u32> = backend.searches.lock().unwrap().iter().map(|s| s.1).collect();
        assert_eq!(starts, vec![0, 10, 20, 30]);

        // Exhausted: no further request goes out.
        assert!(load_next_batch(&mut paginator, &backend).await.is_none());
        assert_eq!(backend.searches.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_no_overlapping_batches() {
        let mut paginator = Paginator::default();
        paginator.reset("gout");
        assert!(paginator.try_begin().is_some());
        assert!(paginator.is_loading());
        assert!(paginator.try_begin().is_none());
    }

    #[test]
    fn test_reset_clears_state_and_ignores_stale_results() {
        let mut paginator = Paginator::default();
        paginator.reset("gout");
        let old = paginator.try_begin().unwrap();

        paginator.reset("lupus");
        assert!(!paginator.is_loading());
        assert_eq!(paginator.offset(), 0);

        let stale = BatchResult { generation: old.generation, start: 0, outcome: BatchOutcome::Exhausted };
        assert!(!paginator.finish(&stale));
        assert!(!paginator.is_exhausted());

        let fresh = paginator.try_begin().unwrap();
        assert_eq!(fresh.query, "lupus");
        assert_eq!(fresh.start, 0);
    }

    #[test]
    fn test_query_truncated() {
        let mut paginator = Paginator::default();
        paginator.reset("a".repeat(MAX_QUERY_CHARS + 50));
        assert_eq!(paginator.try_begin().unwrap().query.chars().count(), MAX_QUERY_CHARS);
    }

    #[tokio::test]
    async fn test_failure_keeps_offset_and_allows_retry() {
        let mut backend = FakeBackend::new(25);
        backend.fail_fetch = true;
        let mut paginator = Paginator::default();
        paginator.reset("gout");

        let result = load_next_batch(&mut paginator, &backend).await.unwrap();
        assert!(matches!(result.outcome, BatchOutcome::Failed(_)));
        assert_eq!(paginator.offset(), 0);
        assert!(!paginator.is_loading());
        assert!(!paginator.is_exhausted());
    }

    #[tokio::test]
    async fn test_failed_free_check_still_loads_articles() {
        let mut backend = FakeBackend::new(25);
        backend.fail_free = true;
        backend.free = vec!["2".to_string()];
        let mut paginator = Paginator::default();
        paginator.reset("gout");

        let result = load_next_batch(&mut paginator, &backend).await.unwrap();
        let BatchOutcome::Articles(articles) = result.outcome else {
            panic!("expected articles");
        };
        assert_eq!(articles.len(), 10);
        assert_eq!(paginator.offset(), 10);

        // PMC-backed (odd) ids stay free; "2" is not marked.
        assert!(articles[0].is_free);
        assert!(!articles[1].is_free);

        let next = load_next_batch(&mut paginator, &backend).await.unwrap();
        assert_eq!(next.start, 10);
        assert_eq!(paginator.offset(), 20);
    }

    #[tokio::test]
    async fn test_free_status_merge() {
        let mut backend = FakeBackend::new(4);
        // "2" is free at the publisher; "3" has a PMC id and is absent from the list.
        backend.free = vec!["2".to_string()];
        let request = BatchRequest { query: "q".into(), start: 0, max: 10, generation: 0 };

        let result = run_batch(&backend, &request).await;
        let BatchOutcome::Articles(articles) = result.outcome else {
            panic!("expected articles");
        };
        let free: Vec<bool> = articles.iter().map(|a| a.is_free).collect();
        assert_eq!(free, vec![true, true, true, false]);
    }

    #[test]
    fn test_pmc_always_free() {
        let mut articles = vec![article("1", Some("PMC9")), article("2", None)];
        articles[0].is_free = false;
        merge_free_status(&mut articles, &[]);
        assert!(articles[0].is_free);
        assert!(!articles[1].is_free);
    }
}
