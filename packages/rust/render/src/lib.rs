//! Response pipeline: turns raw model answers into display markup.
//!
//! An answer goes through three steps:
//! 1. Availability check: answers that admit the document lacks the
//!    information escalate to the contact form and are not rendered
//! 2. Block parsing: headings, bullet lists and numbered lines
//! 3. HTML synthesis with domain-term emphasis on text nodes
//!
//! All model text is escaped, so every block tag opened is closed whatever
//! the answer contains.

mod blocks;
mod classify;
mod emphasis;
mod html;
mod text;

use tracing::debug;

use docanalyzer_shared::{RenderConfig, Result};

pub use blocks::{Block, parse_blocks};
pub use classify::needs_escalation;
pub use emphasis::{Highlighter, escape_html};
pub use html::error_panel;
pub use text::blocks_to_text;

/// Structured answer ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    /// Parsed blocks, for non-HTML front ends.
    pub blocks: Vec<Block>,
    /// HTML fragment.
    pub html: String,
}

/// Outcome of rendering one answer. Exactly one variant per question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Blank answer; nothing to show.
    Empty,
    /// The document does not cover the question; show the contact form.
    Escalate,
    /// Display this markup.
    Markup(Markup),
}

impl Rendered {
    /// The HTML fragment, if there is one.
    pub fn html(&self) -> Option<&str> {
        match self {
            Self::Markup(m) => Some(&m.html),
            _ => None,
        }
    }
}

/// Renders answers with a fixed emphasis vocabulary.
#[derive(Debug, Clone)]
pub struct Renderer {
    highlighter: Highlighter,
    item_base_span: bool,
}

impl Renderer {
    /// Build a renderer from the `[render]` config section.
    pub fn new(config: &RenderConfig) -> Result<Self> {
        Ok(Self {
            highlighter: Highlighter::new(&config.terms)?,
            item_base_span: true,
        })
    }

    /// Skip the neutral span around list-item text, for containers that set
    /// the base text color themselves.
    pub fn without_item_base_span(mut self) -> Self {
        self.item_base_span = false;
        self
    }

    /// Classify and render a raw answer.
    pub fn render(&self, answer: &str) -> Rendered {
        if answer.trim().is_empty() {
            return Rendered::Empty;
        }

        if needs_escalation(answer) {
            debug!("answer reports missing information, escalating");
            return Rendered::Escalate;
        }

        let blocks = parse_blocks(answer);
        if blocks.is_empty() {
            return Rendered::Empty;
        }

        let html = html::blocks_to_html(&blocks, &self.highlighter, self.item_base_span);
        debug!(blocks = blocks.len(), html_len = html.len(), "answer rendered");

        Rendered::Markup(Markup { blocks, html })
    }
}
