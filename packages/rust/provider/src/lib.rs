//! HTTP clients for the answer service.
//!
//! Two ways to get an answer for a `(document, question)` pair:
//! - [`OpenRouterClient`] calls the completion provider directly
//! - [`AnalyzeApiClient`] goes through a running DocAnalyzer server

pub mod api;
mod openrouter;
pub mod prompt;

pub use api::{AnalyzeApiClient, AnalyzeRequest, AnalyzeResponse, ErrorResponse};
pub use openrouter::{NO_RESPONSE_TEXT, OpenRouterClient};
pub use prompt::{AnswerRequest, ChatMessage};

/// User-Agent string for outbound requests.
const USER_AGENT: &str = concat!("DocAnalyzer/", env!("CARGO_PKG_VERSION"));
