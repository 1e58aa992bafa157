// LLM abstraction layer

pub mod provider;
pub mod pollinations;

pub use provider::*;
pub use crate::types::{AppResult, LLMRequest};
