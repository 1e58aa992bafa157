//! TUI Widgets

mod detail;
mod library;
mod results;

pub use detail::{render_detail, summary_text};
pub use library::render_library;
pub use results::{article_lines, render_results};
