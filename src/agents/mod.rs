//! Agent System
//!
//! The two AI-backed steps of a search session:
//!
//! - **Query Agent**: translates free text into a PubMed boolean query
//! - **Summary Agent**: judges and summarizes one article against the search
//!
//! ```text
//! User input ──► Query Agent ──► esearch / efetch ──► results
//!                                                        │
//!                                    Summary Agent ◄─────┘ (per article, on demand)
//! ```

pub mod query;
pub mod summary;

pub use query::QueryAgent;
pub use summary::SummaryAgent;
