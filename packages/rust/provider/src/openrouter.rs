//! OpenRouter-compatible chat-completions client.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use docanalyzer_shared::{AnalyzerError, ProviderSettings, Result};

use crate::USER_AGENT;
use crate::prompt::{AnswerRequest, preview};

/// Answer text used when the provider returns no content.
pub const NO_RESPONSE_TEXT: &str = "No response from API";

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<serde_json::Value>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    /// First choice's text: chat shape (`message.content`) first, then the
    /// legacy completion shape (`text`). Trimmed; missing or empty content
    /// becomes [`NO_RESPONSE_TEXT`].
    fn into_answer(self) -> String {
        let text = self.choices.into_iter().next().and_then(|choice| {
            choice
                .message
                .and_then(|m| m.content)
                .filter(|c| !c.is_empty())
                .or(choice.text.filter(|t| !t.is_empty()))
        });
        text.unwrap_or_else(|| NO_RESPONSE_TEXT.to_string())
            .trim()
            .to_string()
    }
}

/// Client for the configured completion endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: Client,
    settings: ProviderSettings,
}

impl OpenRouterClient {
    /// Build a client; the request timeout comes from `settings`.
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalyzerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, settings })
    }

    /// Ask `question` about `document` and return the trimmed answer text.
    ///
    /// Fails with a config error before any I/O when the API key is missing.
    #[instrument(skip_all, fields(model = %self.settings.model))]
    pub async fn complete(&self, document: &str, question: &str) -> Result<String> {
        let api_key = self.settings.require_api_key()?;

        let request = AnswerRequest::build(&self.settings, document, question);
        debug!(
            url = %self.settings.api_url,
            document = %preview(document, 100),
            question = %question,
            max_tokens = request.max_tokens,
            temperature = request.temperature,
            top_p = request.top_p,
            api_key = "[REDACTED]",
            "sending completion request"
        );

        let response = self
            .http
            .post(self.settings.api_url.clone())
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.settings.site_url)
            .header("X-Title", &self.settings.site_name)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = upstream_message(status, &body);
            error!(status = status.as_u16(), error = %message, "completion request failed");
            return Err(AnalyzerError::upstream(Some(status.as_u16()), message));
        }

        let body: CompletionResponse = response.json().await.map_err(|e| {
            AnalyzerError::upstream(Some(status.as_u16()), format!("malformed response body: {e}"))
        })?;

        info!(
            model = body.model.as_deref().unwrap_or("unknown"),
            usage = %body.usage.as_ref().map(|u| u.to_string()).unwrap_or_default(),
            "completion received"
        );

        Ok(body.into_answer())
    }

    fn transport_error(&self, e: reqwest::Error) -> AnalyzerError {
        if e.is_timeout() {
            AnalyzerError::Network(format!(
                "request timed out after {}s",
                self.settings.timeout.as_secs()
            ))
        } else {
            AnalyzerError::Network(format!("request failed: {}", e.without_url()))
        }
    }
}

/// Best description of a failed response: the provider's `error` payload as
/// JSON when present, else the status reason.
fn upstream_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .map(|e| e.to_string())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        })
}
