//! Canonical-markdown block model.
//!
//! Parses the canonical document once into a sequence of typed blocks with
//! inline spans. Both output backends walk the same tree, so structural
//! inference (what is a table, what is a list) happens in exactly one place
//! and escaping decisions stay local to each visitor.

/// A block-level element of the canonical document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, spans: Vec<Span> },
    Table { header: Vec<Vec<Span>>, rows: Vec<Vec<Vec<Span>>> },
    List(Vec<Vec<Span>>),
    CodeBlock(String),
    Rule,
    /// Consecutive bare lines grouped together; inner line breaks preserved.
    Paragraph(Vec<Vec<Span>>),
}

/// An inline element. Code and link contents are carried raw; each visitor
/// escapes at emission time, exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Code(String),
    Strong(String),
    Emphasis(String),
    Link { label: String, url: String },
}

/// Parse canonical markdown into blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<Vec<Span>> = Vec::new();
    let mut i = 0;

    macro_rules! flush_paragraph {
        () => {
            if !paragraph.is_empty() {
                blocks.push(Block::Paragraph(std::mem::take(&mut paragraph)));
            }
        };
    }

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph!();
            i += 1;
            continue;
        }

        // Fenced code: everything up to the closing fence is opaque text.
        if trimmed.starts_with("```") {
            flush_paragraph!();
            let mut inner = Vec::new();
            i += 1;
            while i < lines.len() && !lines[i].trim().starts_with("```") {
                inner.push(lines[i]);
                i += 1;
            }
            i += 1; // skip the closing fence (or EOF)
            blocks.push(Block::CodeBlock(inner.join("\n")));
            continue;
        }

        if let Some((level, rest)) = heading_line(trimmed) {
            flush_paragraph!();
            blocks.push(Block::Heading {
                level,
                spans: parse_inline(rest),
            });
            i += 1;
            continue;
        }

        if is_rule_line(trimmed) {
            flush_paragraph!();
            blocks.push(Block::Rule);
            i += 1;
            continue;
        }

        if trimmed.starts_with('|') {
            flush_paragraph!();
            let mut raw_rows = Vec::new();
            while i < lines.len() && lines[i].trim().starts_with('|') {
                raw_rows.push(split_table_row(lines[i].trim()));
                i += 1;
            }
            blocks.push(table_from_rows(raw_rows));
            continue;
        }

        if list_item_text(trimmed).is_some() {
            flush_paragraph!();
            let mut items = Vec::new();
            while i < lines.len() {
                match list_item_text(lines[i].trim()) {
                    Some(text) => {
                        items.push(parse_inline(text));
                        i += 1;
                    }
                    None => break,
                }
            }
            blocks.push(Block::List(items));
            continue;
        }

        paragraph.push(parse_inline(trimmed));
        i += 1;
    }
    if !paragraph.is_empty() {
        blocks.push(Block::Paragraph(paragraph));
    }
    blocks
}

fn heading_line(line: &str) -> Option<(u8, &str)> {
    for level in (1..=3u8).rev() {
        let marker = &"###"[..level as usize];
        if let Some(rest) = line.strip_prefix(marker) {
            if let Some(text) = rest.strip_prefix(' ') {
                return Some((level, text.trim()));
            }
        }
    }
    None
}

fn is_rule_line(line: &str) -> bool {
    line.len() >= 3
        && (line.bytes().all(|b| b == b'-')
            || line.bytes().all(|b| b == b'*')
            || line.bytes().all(|b| b == b'_'))
}

fn list_item_text(line: &str) -> Option<&str> {
    line.strip_prefix("- ").or_else(|| line.strip_prefix("* "))
}

fn split_table_row(line: &str) -> Vec<String> {
    let inner = line.trim_matches('|');
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Alignment-separator cells look like `---`, `:---`, `---:` or `:---:`.
fn is_separator_row(cells: &[String]) -> bool {
    !cells.is_empty()
        && cells.iter().all(|cell| {
            let core = cell.trim_start_matches(':').trim_end_matches(':');
            !core.is_empty() && core.bytes().all(|b| b == b'-')
        })
}

fn table_from_rows(raw_rows: Vec<Vec<String>>) -> Block {
    let mut remaining: Vec<Vec<String>> = raw_rows
        .into_iter()
        .filter(|cells| !is_separator_row(cells))
        .collect();
    let header = if remaining.is_empty() {
        Vec::new()
    } else {
        remaining.remove(0).iter().map(|c| parse_inline(c)).collect()
    };
    let rows = remaining
        .iter()
        .map(|cells| cells.iter().map(|c| parse_inline(c)).collect())
        .collect();
    Block::Table { header, rows }
}

/// Parse inline markup within one line or cell.
pub fn parse_inline(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    macro_rules! flush_plain {
        () => {
            if !plain.is_empty() {
                spans.push(Span::Text(std::mem::take(&mut plain)));
            }
        };
    }

    while i < chars.len() {
        match chars[i] {
            '`' => {
                if let Some(end) = find_char(&chars, i + 1, '`') {
                    flush_plain!();
                    spans.push(Span::Code(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                } else {
                    plain.push('`');
                    i += 1;
                }
            }
            '[' => match parse_link(&chars, i) {
                Some((label, url, next)) => {
                    flush_plain!();
                    spans.push(Span::Link { label, url });
                    i = next;
                }
                None => {
                    plain.push('[');
                    i += 1;
                }
            },
            '*' if chars.get(i + 1) == Some(&'*') => {
                if let Some(end) = find_pair(&chars, i + 2) {
                    flush_plain!();
                    spans.push(Span::Strong(chars[i + 2..end].iter().collect()));
                    i = end + 2;
                } else {
                    plain.push_str("**");
                    i += 2;
                }
            }
            '*' => {
                if let Some(end) = find_char(&chars, i + 1, '*') {
                    flush_plain!();
                    spans.push(Span::Emphasis(chars[i + 1..end].iter().collect()));
                    i = end + 1;
                } else {
                    plain.push('*');
                    i += 1;
                }
            }
            c => {
                plain.push(c);
                i += 1;
            }
        }
    }
    if !plain.is_empty() {
        spans.push(Span::Text(plain));
    }
    spans
}

fn find_char(chars: &[char], from: usize, needle: char) -> Option<usize> {
    (from..chars.len()).find(|&j| chars[j] == needle)
}

/// Find the next `**` at or after `from`.
fn find_pair(chars: &[char], from: usize) -> Option<usize> {
    let mut j = from;
    while j + 1 < chars.len() {
        if chars[j] == '*' && chars[j + 1] == '*' {
            return Some(j);
        }
        j += 1;
    }
    None
}

/// Parse `[label](url)` starting at the opening bracket. Returns the label,
/// url, and the index past the closing parenthesis.
fn parse_link(chars: &[char], start: usize) -> Option<(String, String, usize)> {
    let close = find_char(chars, start + 1, ']')?;
    if chars.get(close + 1) != Some(&'(') {
        return None;
    }
    let end = find_char(chars, close + 2, ')')?;
    let label: String = chars[start + 1..close].iter().collect();
    let url: String = chars[close + 2..end].iter().collect();
    Some((label, url, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        let blocks = parse_blocks("# One\n## Two\n### Three\n#### Four");
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(blocks[1], Block::Heading { level: 2, .. }));
        assert!(matches!(blocks[2], Block::Heading { level: 3, .. }));
        // Level 4 is not a recognized heading; it stays a paragraph.
        assert!(matches!(blocks[3], Block::Paragraph(_)));
    }

    #[test]
    fn test_table_discards_separator_row() {
        let md = "| A | B |\n| --- | :---: |\n| 1 | 2 |";
        let blocks = parse_blocks(md);
        match &blocks[0] {
            Block::Table { header, rows } => {
                assert_eq!(header.len(), 2);
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][0], vec![Span::Text("1".to_string())]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_code_block_is_opaque() {
        let md = "```\n# not a heading\n**not bold**\n```";
        let blocks = parse_blocks(md);
        assert_eq!(
            blocks,
            vec![Block::CodeBlock("# not a heading\n**not bold**".to_string())]
        );
    }

    #[test]
    fn test_list_grouping() {
        let blocks = parse_blocks("- one\n- two\nplain line");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::List(items) => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_paragraph_grouping_skips_blank_runs() {
        let blocks = parse_blocks("line one\nline two\n\n\n\nline three");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Paragraph(lines) => assert_eq!(lines.len(), 2),
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_mixed_spans() {
        let spans = parse_inline("see `code` and [docs](https://example.com) **now**");
        assert_eq!(
            spans,
            vec![
                Span::Text("see ".to_string()),
                Span::Code("code".to_string()),
                Span::Text(" and ".to_string()),
                Span::Link {
                    label: "docs".to_string(),
                    url: "https://example.com".to_string()
                },
                Span::Text(" ".to_string()),
                Span::Strong("now".to_string()),
            ]
        );
    }

    #[test]
    fn test_unclosed_markers_stay_literal() {
        assert_eq!(
            parse_inline("a `tick and [bracket"),
            vec![Span::Text("a `tick and [bracket".to_string())]
        );
    }

    #[test]
    fn test_rule_line() {
        let blocks = parse_blocks("---");
        assert_eq!(blocks, vec![Block::Rule]);
    }
}
