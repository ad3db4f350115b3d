//! HTML output for parsed blocks.
//!
//! Class names target Tailwind, matching the page that embeds the markup.

use crate::blocks::Block;
use crate::emphasis::{Highlighter, escape_html};

const HEADING_OPEN: &str = r#"<h3 class="text-xl font-bold text-blue-700 mt-4 mb-2">"#;
const LIST_OPEN: &str = r#"<ul class="list-disc list-inside mb-4 text-gray-800">"#;
const ITEM_OPEN: &str = r#"<li class="text-gray-800">"#;
const ITEM_BASE_OPEN: &str = r#"<span class="text-gray-800">"#;
const NUMBERED_OPEN: &str = r#"<div class="flex items-start mb-3">"#;
const NUMBER_LABEL_OPEN: &str = r#"<span class="font-bold text-blue-600 mr-2">"#;
const NUMBER_TEXT_OPEN: &str = r#"<span class="flex-1">"#;

/// Render blocks to a single HTML fragment.
///
/// With `item_base_span`, list-item text is wrapped in a neutral span so
/// emphasized and plain runs share a base color.
pub(crate) fn blocks_to_html(
    blocks: &[Block],
    highlighter: &Highlighter,
    item_base_span: bool,
) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            Block::Heading(text) => {
                out.push_str(HEADING_OPEN);
                out.push_str(&highlighter.emphasize(text));
                out.push_str("</h3>");
            }
            Block::List(items) => {
                out.push_str(LIST_OPEN);
                for item in items {
                    out.push_str(ITEM_OPEN);
                    if item_base_span {
                        out.push_str(ITEM_BASE_OPEN);
                        out.push_str(&highlighter.emphasize(item));
                        out.push_str("</span>");
                    } else {
                        out.push_str(&highlighter.emphasize(item));
                    }
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
            Block::Numbered { label, text } => {
                out.push_str(NUMBERED_OPEN);
                out.push_str(NUMBER_LABEL_OPEN);
                out.push_str(&escape_html(label));
                out.push_str("</span>");
                out.push_str(NUMBER_TEXT_OPEN);
                out.push_str(&highlighter.emphasize(text));
                out.push_str("</span></div>");
            }
        }
    }

    out
}

/// Markup shown in place of the answer when a request fails.
pub fn error_panel(message: &str) -> String {
    format!(
        r#"<div class="text-red-600 flex items-center gap-2" role="alert"><span class="flex-1">{}</span></div>"#,
        escape_html(message)
    )
}
