//! The reference document every question is answered against.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use docanalyzer_shared::{AnalyzerError, DocumentConfig, Result};

/// Company profile compiled into the binary.
const BUILTIN_PROFILE: &str = include_str!("../assets/exponentx-profile.txt");

/// Questions offered to users who don't know what to ask.
pub const SAMPLE_QUESTIONS: [&str; 4] = [
    "What are the key services offered by ExponentX?",
    "Where is ExponentX located?",
    "What cloud services does ExponentX provide?",
    "What is their customer commitment?",
];

/// Immutable reference text. Cloning shares the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: Arc<str>,
}

impl Document {
    /// The built-in company profile.
    pub fn builtin() -> Self {
        Self {
            text: Arc::from(BUILTIN_PROFILE),
        }
    }

    /// Read a document from disk. Blank files are rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalyzerError::io(path, e))?;
        if text.trim().is_empty() {
            return Err(AnalyzerError::validation(format!(
                "document {} is empty",
                path.display()
            )));
        }
        info!(?path, bytes = text.len(), "loaded reference document");
        Ok(Self {
            text: Arc::from(text),
        })
    }

    /// The configured document, or the built-in profile when none is set.
    pub fn load(config: &DocumentConfig) -> Result<Self> {
        match &config.path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Full text, passed verbatim with every question.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self {
            text: Arc::from(text),
        }
    }
}
