//! Answer availability check.
//!
//! Models asked about something the document does not cover tend to say so in a
//! handful of stock phrasings. Any of them, anywhere in the answer, means the
//! caller should offer the contact form instead of showing the answer.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Inability phrasings, as regex fragments. Apostrophes match both `'` and `’`.
const INABILITY_PATTERNS: &[&str] = &[
    r"does not mention",
    r"doesn['’]t mention",
    r"couldn['’]t find information",
    r"could not find information",
    r"no information",
    r"do not have enough",
    r"don['’]t have enough",
    r"not mentioned in",
];

static INABILITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(&INABILITY_PATTERNS.join("|"))
        .case_insensitive(true)
        .build()
        .expect("valid regex")
});

/// Whether the answer reports that the document lacks the requested information.
///
/// Blank answers never escalate.
pub fn needs_escalation(answer: &str) -> bool {
    INABILITY_RE.is_match(answer)
}
