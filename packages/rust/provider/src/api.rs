//! `/api/analyze` wire types and a client for them.
//!
//! The server side lives in `docanalyzer-server`; the client here is what a
//! front end uses to reach it instead of calling the provider directly.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

use docanalyzer_shared::{AnalyzerError, Result};

use crate::USER_AGENT;

/// Path of the analyze endpoint.
pub const ANALYZE_PATH: &str = "/api/analyze";

/// `POST /api/analyze` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub document: String,
    pub question: String,
}

/// `POST /api/analyze` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub result: String,
}

/// Error body used by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Either shape, as a client sees it before checking the status.
#[derive(Debug, Deserialize)]
struct AnalyzeReply {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a running analyze server.
#[derive(Debug, Clone)]
pub struct AnalyzeApiClient {
    http: Client,
    endpoint: Url,
}

impl AnalyzeApiClient {
    /// Client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let endpoint = base_url.join(ANALYZE_PATH).map_err(|e| {
            AnalyzerError::config(format!("invalid server URL '{base_url}': {e}"))
        })?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalyzerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Send one question. A missing `result` comes back as an empty string.
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn analyze(&self, document: &str, question: &str) -> Result<String> {
        let body = AnalyzeRequest {
            document: document.to_string(),
            question: question.to_string(),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzerError::Network("request to analyze server timed out".into())
                } else {
                    AnalyzerError::Network(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        let reply: Option<AnalyzeReply> = response.json().await.ok();
        debug!(status = status.as_u16(), "analyze server replied");

        match reply {
            Some(AnalyzeReply {
                error: Some(error), ..
            }) => {
                warn!(status = status.as_u16(), %error, "analyze server reported an error");
                Err(AnalyzerError::Service {
                    status: status.as_u16(),
                    message: error,
                })
            }
            Some(AnalyzeReply { result, .. }) if status.is_success() => {
                Ok(result.unwrap_or_default())
            }
            _ => Err(AnalyzerError::Service {
                status: status.as_u16(),
                message: "Failed to get response from the analyze server".into(),
            }),
        }
    }
}
