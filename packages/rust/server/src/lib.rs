//! HTTP server for DocAnalyzer.
//!
//! Routes:
//! - `POST /api/analyze`: `{document, question}` → `{result}` or `{error}`
//! - `POST /api/contact`: contact form → `{status, id}` or `{error}`
//! - `GET /api/health`: `{status: "ok"}`
//!
//! The analyze handler is a pass-through to the answer service; it never
//! renders and never echoes credentials.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use docanalyzer_core::{AnswerService, ContactRequest, ContactSink};
use docanalyzer_provider::{AnalyzeRequest, AnalyzeResponse, ErrorResponse};
use docanalyzer_shared::{AnalyzerError, Result};

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Handler error, rendered as `{ "error": ... }`.
struct ApiError(AnalyzerError);

impl From<AnalyzerError> for ApiError {
    fn from(e: AnalyzerError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AnalyzerError::validation(format!(
            "invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AnalyzerError::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, "request rejected");
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and routes
// ---------------------------------------------------------------------------

/// Shared handler state.
pub struct AppState<S, C> {
    pub answers: Arc<S>,
    pub contacts: Arc<C>,
}

impl<S, C> Clone for AppState<S, C> {
    fn clone(&self) -> Self {
        Self {
            answers: Arc::clone(&self.answers),
            contacts: Arc::clone(&self.contacts),
        }
    }
}

impl<S, C> AppState<S, C> {
    pub fn new(answers: S, contacts: C) -> Self {
        Self {
            answers: Arc::new(answers),
            contacts: Arc::new(contacts),
        }
    }
}

/// Build the application router.
pub fn router<S, C>(state: AppState<S, C>) -> Router
where
    S: AnswerService + 'static,
    C: ContactSink + 'static,
{
    Router::new()
        .route("/api/analyze", post(analyze::<S, C>))
        .route("/api/contact", post(contact::<S, C>))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[instrument(skip_all)]
async fn analyze<S: AnswerService, C: ContactSink>(
    State(state): State<AppState<S, C>>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;

    if request.question.trim().is_empty() {
        return Err(AnalyzerError::validation("question must not be blank").into());
    }
    if request.document.trim().is_empty() {
        return Err(AnalyzerError::validation("document must not be blank").into());
    }

    info!(
        question = %request.question,
        document_len = request.document.len(),
        "analyze request"
    );

    let result = state
        .answers
        .answer(&request.document, &request.question)
        .await?;

    Ok(Json(AnalyzeResponse { result }))
}

#[instrument(skip_all)]
async fn contact<S: AnswerService, C: ContactSink>(
    State(state): State<AppState<S, C>>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> std::result::Result<Json<serde_json::Value>, ApiError> {
    let Json(request) = payload?;
    let receipt = state.contacts.submit(&request).await?;
    Ok(Json(json!({ "status": "sent", "id": receipt.id })))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Bind a listener on `addr` (e.g. `127.0.0.1:3000`).
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| AnalyzerError::config(format!("invalid bind address '{addr}': {e}")))?;
    TcpListener::bind(addr)
        .await
        .map_err(|e| AnalyzerError::Network(format!("failed to bind {addr}: {e}")))
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let local = listener
        .local_addr()
        .map_err(|e| AnalyzerError::Network(e.to_string()))?;
    info!(addr = %local, "analyze server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AnalyzerError::Network(format!("server error: {e}")))?;

    info!("analyze server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use docanalyzer_core::LogContactSink;
    use docanalyzer_provider::OpenRouterClient;
    use docanalyzer_shared::{AppConfig, ProviderSettings};
    use tokio::sync::oneshot;

    use super::*;

    struct Echo;

    impl AnswerService for Echo {
        async fn answer(&self, document: &str, question: &str) -> Result<String> {
            Ok(format!("{} | {}", document.len(), question))
        }
    }

    async fn spawn<S: AnswerService + 'static>(service: S) -> (SocketAddr, oneshot::Sender<()>) {
        let listener = bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(AppState::new(service, LogContactSink));
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(serve(listener, app, async {
            rx.await.ok();
        }));
        (addr, tx)
    }

    #[tokio::test]
    async fn analyze_returns_result() {
        let (addr, _stop) = spawn(Echo).await;

        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/api/analyze"))
            .json(&json!({ "document": "Doc", "question": "Where?" }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body, json!({ "result": "3 | Where?" }));
    }

    #[tokio::test]
    async fn blank_question_is_bad_request() {
        let (addr, _stop) = spawn(Echo).await;

        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/api/analyze"))
            .json(&json!({ "document": "Doc", "question": "  " }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("question"));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (addr, _stop) = spawn(Echo).await;

        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/api/analyze"))
            .header("content-type", "application/json")
            .body(r#"{"question": 5}"#)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("validation error: invalid request body"));
    }

    #[tokio::test]
    async fn missing_api_key_is_500_without_outbound_call() {
        let upstream = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let mut config = AppConfig::default();
        config.provider.api_url = format!("{}/v1/chat/completions", upstream.uri());
        let settings = ProviderSettings::resolve(&config, |_| None).unwrap();
        let (addr, _stop) = spawn(OpenRouterClient::new(settings).unwrap()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/api/analyze"))
            .json(&json!({ "document": "Doc", "question": "Where?" }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(
            body["error"],
            "config error: OPENROUTER_API_KEY is not set in environment variables"
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_500_without_key() {
        let upstream = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(402).set_body_json(json!({
                "error": { "message": "Insufficient credits" }
            })))
            .mount(&upstream)
            .await;

        let mut config = AppConfig::default();
        config.provider.api_url = format!("{}/v1/chat/completions", upstream.uri());
        let settings = ProviderSettings::resolve(&config, |name| {
            (name == "OPENROUTER_API_KEY").then(|| "sk-very-secret".to_string())
        })
        .unwrap();
        let (addr, _stop) = spawn(OpenRouterClient::new(settings).unwrap()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://{addr}/api/analyze"))
            .json(&json!({ "document": "Doc", "question": "Where?" }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
        let text = resp.text().await.unwrap();
        assert!(text.contains("Insufficient credits"));
        assert!(!text.contains("sk-very-secret"));
    }

    #[tokio::test]
    async fn contact_form_accepted_and_validated() {
        let (addr, _stop) = spawn(Echo).await;
        let client = reqwest::Client::new();

        let ok = client
            .post(format!("http://{addr}/api/contact"))
            .json(&json!({
                "name": "Ada", "phone": "", "email": "ada@example.com",
                "subject": "Pricing", "message": "How much?"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(ok.status(), 200);
        let body: serde_json::Value = ok.json().await.unwrap();
        assert_eq!(body["status"], "sent");

        let bad = client
            .post(format!("http://{addr}/api/contact"))
            .json(&json!({ "name": "Ada" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad.status(), 400);
    }

    #[tokio::test]
    async fn health_check() {
        let (addr, _stop) = spawn(Echo).await;
        let body: serde_json::Value = reqwest::get(format!("http://{addr}/api/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn invalid_bind_address_is_config_error() {
        let err = bind("not-an-address").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::Config { .. }));
    }
}
