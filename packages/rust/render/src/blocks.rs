//! Line-oriented block parser.
//!
//! Model answers arrive as loosely formatted text: numbered steps, lines that
//! end in a colon acting as headers, and bullets in whatever glyph the model
//! felt like using. A single forward pass with one bit of state (is a list
//! open?) turns them into [`Block`]s.

use std::sync::LazyLock;

use regex::Regex;

/// One structural unit of a rendered answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A line that ended with a colon, colon removed.
    Heading(String),
    /// Consecutive plain lines.
    List(Vec<String>),
    /// A `N. text` line. Each one stands alone; numbered lines never share a container.
    Numbered { label: String, text: String },
}

/// Bullet glyphs removed before parsing. Removal is global, so hyphenated
/// words lose their hyphen too.
const BULLET_GLYPHS: [char; 3] = ['-', '*', '•'];

#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Numbered { label: &'a str, text: &'a str },
    Heading(&'a str),
    Item(&'a str),
}

fn classify_line(line: &str) -> LineKind<'_> {
    static NUMBERED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([0-9]+\.)\s(.*)$").expect("valid regex"));

    if line.is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = NUMBERED_RE.captures(line) {
        let label = caps.get(1).map_or("", |m| m.as_str());
        let text = caps.get(2).map_or("", |m| m.as_str());
        return LineKind::Numbered {
            label,
            text: text.trim_start(),
        };
    }

    if let Some(heading) = line.strip_suffix(':') {
        return LineKind::Heading(heading);
    }

    LineKind::Item(line)
}

/// Parse answer text into blocks.
///
/// Total on any input; empty or blank-only text yields no blocks.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let text = text.replace(BULLET_GLYPHS, "");

    let mut blocks = Vec::new();
    let mut open_list: Option<Vec<String>> = None;

    for raw in text.split('\n') {
        match classify_line(raw.trim()) {
            LineKind::Blank => {
                if let Some(items) = open_list.take() {
                    blocks.push(Block::List(items));
                }
            }
            LineKind::Numbered { label, text } => {
                if let Some(items) = open_list.take() {
                    blocks.push(Block::List(items));
                }
                blocks.push(Block::Numbered {
                    label: label.to_string(),
                    text: text.to_string(),
                });
            }
            LineKind::Heading(heading) => {
                if let Some(items) = open_list.take() {
                    blocks.push(Block::List(items));
                }
                blocks.push(Block::Heading(heading.to_string()));
            }
            LineKind::Item(item) => {
                open_list.get_or_insert_with(Vec::new).push(item.to_string());
            }
        }
    }

    if let Some(items) = open_list {
        blocks.push(Block::List(items));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_scenario() {
        let input = ["Services:", "Cloud", "AI", "", "1. First step", "2. Second step"].join("\n");
        let blocks = parse_blocks(&input);
        assert_eq!(
            blocks,
            vec![
                Block::Heading("Services".into()),
                Block::List(vec!["Cloud".into(), "AI".into()]),
                Block::Numbered {
                    label: "1.".into(),
                    text: "First step".into()
                },
                Block::Numbered {
                    label: "2.".into(),
                    text: "Second step".into()
                },
            ]
        );
    }

    #[test]
    fn plain_lines_form_one_list() {
        let blocks = parse_blocks("Infrastructure\nSecurity\nCloud strategies");
        assert_eq!(
            blocks,
            vec![Block::List(vec![
                "Infrastructure".into(),
                "Security".into(),
                "Cloud strategies".into()
            ])]
        );
    }

    #[test]
    fn bullets_are_stripped() {
        let blocks = parse_blocks("- Workflow automation\n* Migration\n• Data analytics");
        assert_eq!(
            blocks,
            vec![Block::List(vec![
                "Workflow automation".into(),
                "Migration".into(),
                "Data analytics".into()
            ])]
        );
    }

    #[test]
    fn hyphens_inside_words_are_lost() {
        let blocks = parse_blocks("Enterprise-Ready Solutions");
        assert_eq!(
            blocks,
            vec![Block::List(vec!["EnterpriseReady Solutions".into()])]
        );
    }

    #[test]
    fn heading_closes_open_list() {
        let blocks = parse_blocks("One\nTwo\nNext:\nThree");
        assert_eq!(
            blocks,
            vec![
                Block::List(vec!["One".into(), "Two".into()]),
                Block::Heading("Next".into()),
                Block::List(vec!["Three".into()]),
            ]
        );
    }

    #[test]
    fn numbered_line_wins_over_heading() {
        let blocks = parse_blocks("3. Contact details:");
        assert_eq!(
            blocks,
            vec![Block::Numbered {
                label: "3.".into(),
                text: "Contact details:".into()
            }]
        );
    }

    #[test]
    fn number_without_space_is_an_item() {
        let blocks = parse_blocks("24/7 monitoring\n2.5 million users");
        assert_eq!(
            blocks,
            vec![Block::List(vec![
                "24/7 monitoring".into(),
                "2.5 million users".into()
            ])]
        );
    }

    #[test]
    fn surrounding_whitespace_and_crlf_trimmed() {
        let blocks = parse_blocks("  Key Services:  \r\n   Cloud  \r\n");
        assert_eq!(
            blocks,
            vec![
                Block::Heading("Key Services".into()),
                Block::List(vec!["Cloud".into()]),
            ]
        );
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(parse_blocks("").is_empty());
        assert!(parse_blocks("\n\n   \n\t\n").is_empty());
        assert!(parse_blocks("-\n*\n•").is_empty());
    }

    #[test]
    fn classify_rules_in_order() {
        assert_eq!(classify_line(""), LineKind::Blank);
        assert_eq!(
            classify_line("10. Tenth"),
            LineKind::Numbered {
                label: "10.",
                text: "Tenth"
            }
        );
        assert_eq!(classify_line("About Us:"), LineKind::Heading("About Us"));
        assert_eq!(classify_line("Hong Kong"), LineKind::Item("Hong Kong"));
    }
}
