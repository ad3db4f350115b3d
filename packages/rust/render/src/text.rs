//! Plain-text output for terminals.

use crate::blocks::Block;

/// Render blocks as plain text: headings on their own line, list items
/// bulleted and indented, numbered blocks as `N. text`.
pub fn blocks_to_text(blocks: &[Block]) -> String {
    let mut out = String::new();

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 && matches!(block, Block::Heading(_)) {
            out.push('\n');
        }
        match block {
            Block::Heading(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Block::List(items) => {
                for item in items {
                    out.push_str("  • ");
                    out.push_str(item);
                    out.push('\n');
                }
            }
            Block::Numbered { label, text } => {
                out.push_str(label);
                out.push(' ');
                out.push_str(text);
                out.push('\n');
            }
        }
    }

    out
}
