//! Chat-completion request payloads.

use serde::Serialize;

use docanalyzer_shared::ProviderSettings;

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Body of the outbound completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl AnswerRequest {
    /// Build the request for one question: the system instruction, then a
    /// single user message carrying the document and question verbatim.
    pub fn build(settings: &ProviderSettings, document: &str, question: &str) -> Self {
        Self {
            model: settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: settings.system_prompt.clone(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message(document, question),
                },
            ],
            max_tokens: settings.sampling.max_tokens,
            temperature: settings.sampling.temperature,
            top_p: settings.sampling.top_p,
        }
    }
}

/// The user turn: document first, then the question.
pub fn user_message(document: &str, question: &str) -> String {
    format!("Document: {document}\n\nQuestion: {question}")
}

/// Shorten `text` to at most `max_chars` characters for log output.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
