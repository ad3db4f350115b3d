//! Core domain logic for DocAnalyzer.
//!
//! Ties the reference document, the answer service and the response pipeline
//! into an [`AskSession`], and defines the contact-form fallback.

pub mod cache;
pub mod contact;
pub mod document;
pub mod service;
pub mod session;

pub use cache::{ResultCache, normalize_question};
pub use contact::{ContactReceipt, ContactRequest, ContactSink, LogContactSink};
pub use document::{Document, SAMPLE_QUESTIONS};
pub use service::AnswerService;
pub use session::{AskOutcome, AskSession, AskStart, AskTicket};
