//! Search Module
//!
//! Client-side search session state:
//! - [`pagination`]: offset cursor and batch loading for infinite scroll
//! - [`history`]: the last few searches
//! - [`filters`]: date/access/type clauses appended to a query
//! - [`highlight`]: keyword extraction and match highlighting
//! - [`query_builder`]: structured field-tagged queries and presets

pub mod filters;
pub mod highlight;
pub mod history;
pub mod pagination;
pub mod query_builder;

pub use filters::{DateFilter, SearchFilters};
pub use highlight::{extract_keywords, highlight, Segment};
pub use history::SearchHistory;
pub use pagination::{
    load_next_batch, merge_free_status, run_batch, BatchOutcome, BatchRequest, BatchResult, Paginator,
    SearchBackend, BATCH_SIZE,
};
pub use query_builder::{presets, BoolOp, Preset, QueryBuilder, QueryTerm, SearchField};
