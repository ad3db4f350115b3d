//! Contact-form fallback.
//!
//! Shown instead of an answer when the document does not cover the question.
//! Delivery is pluggable through [`ContactSink`]; the bundled
//! [`LogContactSink`] only records the request.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use docanalyzer_shared::{AnalyzerError, Result};

/// Contact form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactRequest {
    /// Name, email and message are required; the email needs an `@`.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(AnalyzerError::validation(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        if !self.email.contains('@') {
            return Err(AnalyzerError::validation(format!(
                "'{}' is not an email address",
                self.email.trim()
            )));
        }

        Ok(())
    }
}

/// Acknowledgement for a submitted request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
}

/// Somewhere to deliver contact requests.
pub trait ContactSink: Send + Sync {
    fn submit(&self, request: &ContactRequest)
    -> impl Future<Output = Result<ContactReceipt>> + Send;
}

/// Validates and logs requests without delivering them anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogContactSink;

impl ContactSink for LogContactSink {
    async fn submit(&self, request: &ContactRequest) -> Result<ContactReceipt> {
        request.validate()?;

        let receipt = ContactReceipt {
            id: Uuid::now_v7(),
            received_at: Utc::now(),
        };
        info!(
            id = %receipt.id,
            name = %request.name,
            email = %request.email,
            subject = %request.subject,
            message_len = request.message.len(),
            "contact request received"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ContactRequest {
        ContactRequest {
            name: "Ada".into(),
            phone: "+852 5555 0000".into(),
            email: "ada@example.com".into(),
            subject: "Pricing".into(),
            message: "How much is managed IT?".into(),
        }
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(filled().validate().is_ok());
    }

    #[test]
    fn phone_and_subject_are_optional() {
        let req = ContactRequest {
            phone: String::new(),
            subject: String::new(),
            ..filled()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn missing_fields_listed() {
        let req = ContactRequest {
            name: " ".into(),
            message: String::new(),
            ..filled()
        };
        let err = req.validate().unwrap_err().to_string();
        assert!(err.contains("name, message"));
    }

    #[test]
    fn email_needs_at_sign() {
        let req = ContactRequest {
            email: "not-an-email".into(),
            ..filled()
        };
        assert!(req.validate().unwrap_err().to_string().contains("not an email"));
    }

    #[test]
    fn form_deserializes_with_missing_fields() {
        let req: ContactRequest =
            serde_json::from_str(r#"{"name":"Ada","email":"a@b.c","message":"hi"}"#).unwrap();
        assert_eq!(req.phone, "");
        assert!(req.validate().is_ok());
    }

    #[tokio::test]
    async fn log_sink_accepts_valid_requests() {
        let receipt = LogContactSink.submit(&filled()).await.unwrap();
        assert!(receipt.received_at <= Utc::now());
    }

    #[tokio::test]
    async fn log_sink_rejects_invalid_requests() {
        let err = LogContactSink
            .submit(&ContactRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Validation { .. }));
    }
}
