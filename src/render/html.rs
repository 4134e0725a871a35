//! HTML backend for the canonical document.
//!
//! Walks the typed block tree and emits markup. Escaping happens exactly once,
//! at the point each raw text fragment is written: literal angle brackets in
//! source text always come out as entities, and tags synthesized here are
//! never fed back through the escaper.

use super::markdown::{parse_blocks, Block, Span};

const STYLE: &str = "body{font-family:-apple-system,'Segoe UI',sans-serif;margin:1.5em;color:#222;line-height:1.5}\
table{border-collapse:collapse;margin:0.8em 0}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f2f2f2}\
code{background:#f5f5f5;padding:1px 4px;border-radius:3px}\
pre{background:#f5f5f5;padding:8px;overflow-x:auto}\
h1{font-size:1.5em}h2{font-size:1.25em}h3{font-size:1.1em}";

/// Convert canonical markdown into a self-contained HTML document.
pub fn render_html(markdown: &str) -> String {
    let body = render_body(markdown);
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        STYLE, body
    )
}

/// Body markup without the document shell.
pub fn render_body(markdown: &str) -> String {
    parse_blocks(markdown)
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, spans } => {
            format!("<h{lv}>{}</h{lv}>", render_spans(spans), lv = level)
        }
        Block::Paragraph(lines) => {
            let inner = lines
                .iter()
                .map(|spans| render_spans(spans))
                .collect::<Vec<_>>()
                .join("<br>\n");
            format!("<p>{}</p>", inner)
        }
        Block::List(items) => {
            let mut out = String::from("<ul>\n");
            for item in items {
                out.push_str("<li>");
                out.push_str(&render_spans(item));
                out.push_str("</li>\n");
            }
            out.push_str("</ul>");
            out
        }
        Block::CodeBlock(text) => format!("<pre><code>{}</code></pre>", escape_html(text)),
        Block::Rule => "<hr>".to_string(),
        Block::Table { header, rows } => {
            let mut out = String::from("<table>\n<thead>\n<tr>");
            for cell in header {
                out.push_str("<th>");
                out.push_str(&render_spans(cell));
                out.push_str("</th>");
            }
            out.push_str("</tr>\n</thead>\n<tbody>\n");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str("<td>");
                    out.push_str(&render_spans(cell));
                    out.push_str("</td>");
                }
                out.push_str("</tr>\n");
            }
            out.push_str("</tbody>\n</table>");
            out
        }
    }
}

fn render_spans(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Span::Text(text) => out.push_str(&escape_html(text)),
            Span::Code(text) => {
                out.push_str("<code>");
                out.push_str(&escape_html(text));
                out.push_str("</code>");
            }
            Span::Strong(text) => {
                out.push_str("<strong>");
                out.push_str(&escape_html(text));
                out.push_str("</strong>");
            }
            Span::Emphasis(text) => {
                out.push_str("<em>");
                out.push_str(&escape_html(text));
                out.push_str("</em>");
            }
            Span::Link { label, url } => {
                out.push_str("<a href=\"");
                out.push_str(&escape_attr(url));
                out.push_str("\">");
                out.push_str(&escape_html(label));
                out.push_str("</a>");
            }
        }
    }
    out
}

fn escape_html(text: &str) -> String {
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

fn escape_attr(text: &str) -> String {
    escape_html(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tag_is_escaped_outside_code() {
        let html = render_body("hello <script>alert(1)</script> world");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_synthesized_heading_is_not_reescaped() {
        let html = render_body("## Summary");
        assert_eq!(html, "<h2>Summary</h2>");
    }

    #[test]
    fn test_code_block_escaped_but_protected_from_markup() {
        let html = render_body("```\n<b>**raw**</b>\n```");
        assert!(html.contains("<pre><code>&lt;b&gt;**raw**&lt;/b&gt;</code></pre>"));
    }

    #[test]
    fn test_inline_code_keeps_angle_brackets_as_entities() {
        let html = render_body("use `Vec<u8>` here");
        assert!(html.contains("<code>Vec&lt;u8&gt;</code>"));
    }

    #[test]
    fn test_link_label_escaped_url_attribute_escaped() {
        let html = render_body("[a <b> label](https://example.com/?a=1&b=2)");
        assert!(html.contains("<a href=\"https://example.com/?a=1&amp;b=2\">a &lt;b&gt; label</a>"));
    }

    #[test]
    fn test_table_header_and_body_cells() {
        let html = render_body("| Key | Title |\n| --- | --- |\n| X-1 | Fix it |");
        assert!(html.contains("<th>Key</th>"));
        assert!(html.contains("<td>X-1</td>"));
        // The separator row never appears as content.
        assert!(!html.contains("---"));
    }

    #[test]
    fn test_emphasis_and_rule() {
        let html = render_body("**bold** and *soft*\n\n---");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>soft</em>"));
        assert!(html.contains("<hr>"));
    }

    #[test]
    fn test_shell_wraps_body() {
        let html = render_html("# Title");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn test_bare_lines_group_into_paragraph() {
        let html = render_body("line one\nline two");
        assert_eq!(html, "<p>line one<br>\nline two</p>");
    }
}
