//! The answer-service seam.

use std::future::Future;

use docanalyzer_provider::{AnalyzeApiClient, OpenRouterClient};
use docanalyzer_shared::Result;

/// Anything that can answer a question about a document with raw text.
pub trait AnswerService: Send + Sync {
    /// Return the raw answer for `question` about `document`.
    fn answer(&self, document: &str, question: &str)
    -> impl Future<Output = Result<String>> + Send;
}

impl AnswerService for OpenRouterClient {
    fn answer(
        &self,
        document: &str,
        question: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        self.complete(document, question)
    }
}

impl AnswerService for AnalyzeApiClient {
    fn answer(
        &self,
        document: &str,
        question: &str,
    ) -> impl Future<Output = Result<String>> + Send {
        self.analyze(document, question)
    }
}
