//! Plain-text backend for the canonical document.
//!
//! Markers are dropped, text is kept. Links flatten to `label (url)`, table
//! separator rows disappear, and runs of 3+ blank lines collapse to 2.

use std::sync::OnceLock;

use regex::Regex;

use super::markdown::{parse_blocks, Block, Span};

/// Convert canonical markdown into plain text.
pub fn render_text(markdown: &str) -> String {
    let rendered = parse_blocks(markdown)
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n");
    collapse_blank_lines(&rendered).trim().to_string()
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { spans, .. } => render_spans(spans),
        Block::Paragraph(lines) => lines
            .iter()
            .map(|spans| render_spans(spans))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::List(items) => items
            .iter()
            .map(|item| format!("- {}", render_spans(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Block::CodeBlock(text) => text.clone(),
        Block::Rule => "---".to_string(),
        Block::Table { header, rows } => {
            let mut lines = Vec::with_capacity(rows.len() + 1);
            if !header.is_empty() {
                lines.push(render_row(header));
            }
            for row in rows {
                lines.push(render_row(row));
            }
            lines.join("\n")
        }
    }
}

fn render_row(cells: &[Vec<Span>]) -> String {
    let inner = cells
        .iter()
        .map(|cell| render_spans(cell))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("| {} |", inner)
}

fn render_spans(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(text) | Span::Code(text) | Span::Strong(text) | Span::Emphasis(text) => {
                out.push_str(text)
            }
            Span::Link { label, url } => {
                out.push_str(label);
                out.push_str(" (");
                out.push_str(url);
                out.push(')');
            }
        }
    }
    out
}

fn collapse_blank_lines(text: &str) -> String {
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RUN.get_or_init(|| Regex::new(r"\n{4,}").unwrap());
    re.replace_all(text, "\n\n\n").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_markers_dropped_text_kept() {
        assert_eq!(render_text("## Summary"), "Summary");
    }

    #[test]
    fn test_link_flattens_to_label_and_url() {
        assert_eq!(
            render_text("see [docs](https://example.com)"),
            "see docs (https://example.com)"
        );
    }

    #[test]
    fn test_emphasis_and_code_markers_dropped() {
        assert_eq!(render_text("**bold** and `code`"), "bold and code");
    }

    #[test]
    fn test_separator_row_dropped_pipe_rows_kept() {
        let text = render_text("| A | B |\n| --- | --- |\n| 1 | 2 |");
        assert_eq!(text, "| A | B |\n| 1 | 2 |");
    }

    #[test]
    fn test_fence_markers_dropped_content_kept() {
        let text = render_text("```\nlet x = 1;\n```");
        assert_eq!(text, "let x = 1;");
    }

    #[test]
    fn test_blank_runs_collapse_and_outer_trim() {
        let text = collapse_blank_lines("a\n\n\n\n\n\nb");
        assert_eq!(text, "a\n\n\nb");
        assert_eq!(render_text("\n\na\n\n"), "a");
    }
}
