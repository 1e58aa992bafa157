// PubMed AI - AI-assisted PubMed search: a rate-limited proxy and a terminal client

pub mod config;
pub mod models;
pub mod types;
pub mod throttle;  // Minimum spacing between upstream calls
pub mod pubmed;    // E-utilities client and efetch XML parsing
pub mod llm;
pub mod agents;    // Query generation and summaries
pub mod routes;
pub mod middleware;
pub mod utils;
pub mod search;    // Client-side search state: pagination, history, filters
pub mod library;   // Saved articles in folders
pub mod api_client;
pub mod tui;       // Terminal User Interface

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
