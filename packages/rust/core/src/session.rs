//! Ask session: one user's sequence of questions.
//!
//! The session owns everything a front end would otherwise keep in globals:
//! the rendered-answer cache, the last answered question, and the
//! cancellation token of the request in flight. An ask is split in three so
//! callers can run the network part concurrently with new input:
//!
//! 1. [`AskSession::begin`] cancels the previous request, consults the cache,
//!    and hands out an [`AskTicket`] when a request is needed
//! 2. [`AskTicket::fetch`] calls the answer service, aborting on cancellation
//! 3. [`AskSession::finish`] renders the answer, or drops it if it was superseded
//!
//! Only the newest ticket can produce an outcome, so the displayed answer
//! always belongs to the latest question.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use docanalyzer_render::{Markup, Rendered, Renderer, error_panel};
use docanalyzer_shared::{AnalyzerError, CacheConfig, CacheScope, Result};

use crate::cache::{ResultCache, normalize_question};
use crate::document::Document;
use crate::service::AnswerService;

/// What the front end should show for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Show this answer.
    Answer(Markup),
    /// The document does not cover the question; show the contact form.
    ContactForm,
    /// The model returned nothing.
    NoAnswer,
    /// The request failed; show `message` in place of the answer.
    Failed { message: String },
}

impl AskOutcome {
    fn from_rendered(rendered: Rendered) -> Self {
        match rendered {
            Rendered::Markup(m) => Self::Answer(m),
            Rendered::Escalate => Self::ContactForm,
            Rendered::Empty => Self::NoAnswer,
        }
    }

    /// HTML for the answer panel: the answer or the error panel.
    /// `None` when the panel should be hidden.
    pub fn html(&self) -> Option<String> {
        match self {
            Self::Answer(m) => Some(m.html.clone()),
            Self::Failed { message } => Some(error_panel(message)),
            Self::ContactForm | Self::NoAnswer => None,
        }
    }
}

/// Result of starting an ask.
#[derive(Debug)]
pub enum AskStart {
    /// Blank question; nothing happened.
    Ignored,
    /// Served from cache; no request needed.
    Cached(AskOutcome),
    /// A request is needed; run [`AskTicket::fetch`] and pass the result to
    /// [`AskSession::finish`].
    Fetch(AskTicket),
}

/// One outstanding request.
#[derive(Debug)]
pub struct AskTicket {
    id: Uuid,
    question: String,
    normalized: String,
    document: Document,
    token: CancellationToken,
}

impl AskTicket {
    /// Time-ordered request id, for logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The question as the user typed it.
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Whether a newer question superseded this one.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Call `service`, returning [`AnalyzerError::Cancelled`] as soon as the
    /// ticket is superseded.
    #[instrument(skip_all, fields(request_id = %self.id))]
    pub async fn fetch<S: AnswerService>(&self, service: &S) -> Result<String> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("request superseded before completion");
                Err(AnalyzerError::Cancelled)
            }
            answer = service.answer(self.document.text(), &self.question) => answer,
        }
    }
}

/// Per-client ask state.
#[derive(Debug)]
pub struct AskSession {
    document: Document,
    renderer: Renderer,
    cache: ResultCache,
    scope: CacheScope,
    last_question: Option<String>,
    current: Option<CancellationToken>,
}

impl AskSession {
    pub fn new(document: Document, renderer: Renderer, cache: &CacheConfig) -> Self {
        Self {
            document,
            renderer,
            cache: ResultCache::new(cache.capacity),
            scope: cache.scope,
            last_question: None,
            current: None,
        }
    }

    /// Number of cached answers.
    pub fn cached_answers(&self) -> usize {
        self.cache.len()
    }

    /// Start asking `question`.
    ///
    /// Blank questions are ignored without touching the request in flight.
    /// Otherwise the previous request is cancelled first, then the cache is
    /// consulted according to the configured scope.
    pub fn begin(&mut self, question: &str) -> AskStart {
        let normalized = normalize_question(question);
        if normalized.is_empty() {
            return AskStart::Ignored;
        }

        self.cancel_current();

        let eligible = match self.scope {
            CacheScope::Last => self.last_question.as_deref() == Some(normalized.as_str()),
            CacheScope::Any => true,
        };
        if eligible {
            if let Some(rendered) = self.cache.get(&normalized) {
                debug!(question = %normalized, "serving cached answer");
                return AskStart::Cached(AskOutcome::from_rendered(rendered.clone()));
            }
        }

        let token = CancellationToken::new();
        self.current = Some(token.clone());

        let ticket = AskTicket {
            id: Uuid::now_v7(),
            question: question.to_string(),
            normalized,
            document: self.document.clone(),
            token,
        };
        info!(request_id = %ticket.id, question = %ticket.question, "asking");

        AskStart::Fetch(ticket)
    }

    /// Turn a fetch result into an outcome.
    ///
    /// Returns `None` when the ticket was superseded; its answer or error is
    /// discarded without a trace.
    pub fn finish(&mut self, ticket: AskTicket, answer: Result<String>) -> Option<AskOutcome> {
        if ticket.is_cancelled() || answer.as_ref().is_err_and(AnalyzerError::is_cancelled) {
            debug!(request_id = %ticket.id, "discarding superseded answer");
            return None;
        }
        self.current = None;

        match answer {
            Ok(text) => {
                let rendered = self.renderer.render(&text);
                if rendered != Rendered::Empty {
                    self.cache.insert(ticket.normalized.clone(), rendered.clone());
                }
                self.last_question = Some(ticket.normalized);
                Some(AskOutcome::from_rendered(rendered))
            }
            Err(e) => {
                info!(request_id = %ticket.id, error = %e, "ask failed");
                Some(AskOutcome::Failed {
                    message: e.to_string(),
                })
            }
        }
    }

    /// Begin, fetch and finish in one go.
    ///
    /// `None` for blank questions.
    pub async fn ask<S: AnswerService>(
        &mut self,
        service: &S,
        question: &str,
    ) -> Option<AskOutcome> {
        match self.begin(question) {
            AskStart::Ignored => None,
            AskStart::Cached(outcome) => Some(outcome),
            AskStart::Fetch(ticket) => {
                let answer = ticket.fetch(service).await;
                self.finish(ticket, answer)
            }
        }
    }

    /// Cancel the request in flight, if any.
    pub fn cancel_current(&mut self) {
        if let Some(token) = self.current.take() {
            debug!("cancelling in-flight request");
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use docanalyzer_shared::RenderConfig;
    use tokio::sync::Notify;

    use super::*;

    /// Canned answers keyed by question; counts calls.
    struct Scripted {
        answers: HashMap<&'static str, Result<String>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(answers: Vec<(&'static str, Result<String>)>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AnswerService for Scripted {
        async fn answer(&self, _document: &str, question: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answers.get(question.trim()) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(e)) => Err(AnalyzerError::Network(e.to_string())),
                None => Ok(String::new()),
            }
        }
    }

    /// Blocks questions listed in `held` until released.
    struct Gated {
        held: Mutex<Vec<&'static str>>,
        release: Notify,
    }

    impl AnswerService for Gated {
        async fn answer(&self, _document: &str, question: &str) -> Result<String> {
            let must_wait = self.held.lock().unwrap().iter().any(|h| *h == question);
            if must_wait {
                self.release.notified().await;
            }
            Ok(format!("{question} answer"))
        }
    }

    fn session(scope: CacheScope) -> AskSession {
        let renderer = Renderer::new(&RenderConfig::default()).unwrap();
        AskSession::new(
            Document::from("Doc"),
            renderer,
            &CacheConfig {
                capacity: 16,
                scope,
            },
        )
    }

    fn answer_html(outcome: Option<AskOutcome>) -> String {
        match outcome {
            Some(AskOutcome::Answer(m)) => m.html,
            other => panic!("expected answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn repeat_question_served_from_cache() {
        let service = Scripted::new(vec![("Where?", Ok("Hong Kong".into()))]);
        let mut s = session(CacheScope::Last);

        let first = answer_html(s.ask(&service, "Where?").await);
        assert_eq!(service.calls(), 1);

        match s.begin("  WHERE?  ") {
            AskStart::Cached(AskOutcome::Answer(m)) => assert_eq!(m.html, first),
            other => panic!("expected cache hit, got {other:?}"),
        }
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn last_scope_only_matches_latest_question() {
        let service = Scripted::new(vec![
            ("Q", Ok("Answer one".into())),
            ("Q2", Ok("Answer two".into())),
        ]);
        let mut s = session(CacheScope::Last);

        s.ask(&service, "Q").await;
        s.ask(&service, "Q2").await;
        s.ask(&service, "Q").await;

        assert_eq!(service.calls(), 3);
        assert_eq!(s.cached_answers(), 2);
    }

    #[tokio::test]
    async fn any_scope_matches_every_cached_question() {
        let service = Scripted::new(vec![
            ("Q", Ok("Answer one".into())),
            ("Q2", Ok("Answer two".into())),
        ]);
        let mut s = session(CacheScope::Any);

        s.ask(&service, "Q").await;
        s.ask(&service, "Q2").await;
        s.ask(&service, "q").await;

        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn blank_question_is_ignored() {
        let service = Scripted::new(vec![]);
        let mut s = session(CacheScope::Last);
        assert!(matches!(s.begin("   "), AskStart::Ignored));
        assert!(s.ask(&service, "").await.is_none());
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn blank_question_leaves_request_in_flight() {
        let mut s = session(CacheScope::Last);
        let AskStart::Fetch(ticket) = s.begin("A") else {
            panic!("expected fetch");
        };
        s.begin("  ");
        assert!(!ticket.is_cancelled());
    }

    #[tokio::test]
    async fn escalation_shows_contact_form() {
        let service = Scripted::new(vec![(
            "Prices?",
            Ok("The document does not mention pricing.".into()),
        )]);
        let mut s = session(CacheScope::Last);

        let outcome = s.ask(&service, "Prices?").await;
        assert_eq!(outcome, Some(AskOutcome::ContactForm));
        assert_eq!(outcome.and_then(|o| o.html()), None);

        assert!(matches!(
            s.begin("prices?"),
            AskStart::Cached(AskOutcome::ContactForm)
        ));
    }

    #[tokio::test]
    async fn empty_answer_is_no_answer_and_not_cached() {
        let service = Scripted::new(vec![("Q", Ok("   ".into()))]);
        let mut s = session(CacheScope::Last);

        assert_eq!(s.ask(&service, "Q").await, Some(AskOutcome::NoAnswer));
        assert_eq!(s.cached_answers(), 0);
        s.ask(&service, "Q").await;
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn failure_is_shown_and_not_cached() {
        let service = Scripted::new(vec![(
            "Q",
            Err(AnalyzerError::Network("connection reset".into())),
        )]);
        let mut s = session(CacheScope::Any);

        let outcome = s.ask(&service, "Q").await.unwrap();
        match &outcome {
            AskOutcome::Failed { message } => assert!(message.contains("connection reset")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(outcome.html().unwrap().contains("text-red-600"));
        assert_eq!(s.cached_answers(), 0);
    }

    #[tokio::test]
    async fn newer_question_wins_over_slow_one() {
        let service = Gated {
            held: Mutex::new(vec!["A"]),
            release: Notify::new(),
        };
        let mut s = session(CacheScope::Last);

        let AskStart::Fetch(ticket_a) = s.begin("A") else {
            panic!("expected fetch for A");
        };
        let AskStart::Fetch(ticket_b) = s.begin("B") else {
            panic!("expected fetch for B");
        };
        assert!(ticket_a.is_cancelled());
        assert!(!ticket_b.is_cancelled());

        let (answer_a, answer_b) = tokio::join!(ticket_a.fetch(&service), ticket_b.fetch(&service));
        assert!(matches!(answer_a, Err(AnalyzerError::Cancelled)));

        let shown_b = s.finish(ticket_b, answer_b);
        let shown_a = s.finish(ticket_a, answer_a);

        assert!(answer_html(shown_b).contains("B answer"));
        assert!(shown_a.is_none());
        assert_eq!(s.cached_answers(), 1);
    }

    #[tokio::test]
    async fn cancelled_error_from_live_ticket_is_swallowed() {
        let mut s = session(CacheScope::Last);
        let AskStart::Fetch(ticket) = s.begin("A") else {
            panic!("expected fetch");
        };
        assert!(!ticket.is_cancelled());
        assert!(s.finish(ticket, Err(AnalyzerError::Cancelled)).is_none());
        assert_eq!(s.cached_answers(), 0);
    }

    #[tokio::test]
    async fn late_success_of_superseded_request_is_discarded() {
        let service = Scripted::new(vec![("A", Ok("stale".into())), ("B", Ok("fresh".into()))]);
        let mut s = session(CacheScope::Any);

        let AskStart::Fetch(ticket_a) = s.begin("A") else {
            panic!("expected fetch for A");
        };
        // A's response arrives after B was issued but before A noticed.
        let stale = service.answer("Doc", "A").await;
        let AskStart::Fetch(ticket_b) = s.begin("B") else {
            panic!("expected fetch for B");
        };

        assert!(s.finish(ticket_a, stale).is_none());
        let fresh = ticket_b.fetch(&service).await;
        assert!(answer_html(s.finish(ticket_b, fresh)).contains("fresh"));
        assert!(matches!(s.begin("A"), AskStart::Fetch(_)));
    }
}
