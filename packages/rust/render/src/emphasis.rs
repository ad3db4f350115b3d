//! Domain-term emphasis and HTML escaping for text nodes.

use regex::{Regex, RegexBuilder};

use docanalyzer_shared::{AnalyzerError, Result};

/// Class applied to emphasized terms.
pub(crate) const EMPHASIS_CLASS: &str = "font-semibold text-blue-600";

/// Case-insensitive whole-word matcher for a fixed vocabulary.
///
/// Matching happens once over raw text, non-overlapping and leftmost-first with
/// longer terms tried before shorter ones, so emphasis markup is never scanned again.
#[derive(Debug, Clone)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    /// Build a highlighter for `terms`. Blank terms are ignored.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        let mut terms: Vec<&str> = terms
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .collect();

        if terms.is_empty() {
            return Ok(Self { pattern: None });
        }

        terms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        terms.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        let alternation = terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&format!(r"\b(?:{alternation})\b"))
            .case_insensitive(true)
            .build()
            .map_err(|e| AnalyzerError::config(format!("invalid emphasis term list: {e}")))?;

        Ok(Self {
            pattern: Some(pattern),
        })
    }

    /// A highlighter that emphasizes nothing.
    pub fn none() -> Self {
        Self { pattern: None }
    }

    /// Escape `text` for HTML and wrap each term occurrence in an emphasis span.
    /// The matched text keeps its original casing.
    pub fn emphasize(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return escape_html(text);
        };

        let mut out = String::with_capacity(text.len() + 16);
        let mut last = 0;
        for m in pattern.find_iter(text) {
            out.push_str(&escape_html(&text[last..m.start()]));
            out.push_str(&format!(
                r#"<span class="{EMPHASIS_CLASS}">{}</span>"#,
                escape_html(m.as_str())
            ));
            last = m.end();
        }
        out.push_str(&escape_html(&text[last..]));
        out
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
