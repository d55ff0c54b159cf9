use std::sync::OnceLock;

use regex::Regex;

use super::{Inline, ListKind};

fn bold_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold regex must compile"))
}

fn inline_code_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"`([^`]+)`").expect("inline code regex must compile"))
}

/// Classifies one prose line by its prefix and formats its content.
pub(super) fn classify_line(line: &str) -> Inline {
    for (prefix, level) in [("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Inline::Heading {
                level,
                children: format_inline(rest),
            };
        }
    }

    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return Inline::ListItem {
            kind: ListKind::Unordered,
            children: format_inline(rest),
        };
    }

    if let Some((number, rest)) = ordered_item(line) {
        return Inline::ListItem {
            kind: ListKind::Ordered(number),
            children: format_inline(rest),
        };
    }

    if line.trim().is_empty() {
        return Inline::Break;
    }

    Inline::Paragraph(format_inline(line))
}

fn ordered_item(line: &str) -> Option<(u64, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }

    let rest = line[digits..].strip_prefix(". ")?;
    let number = line[..digits].parse().unwrap_or(u64::MAX);
    Some((number, rest))
}

/// Splits `text` into bold spans first, then inline code spans inside the non-bold
/// fragments. Unbalanced markers stay literal.
pub(super) fn format_inline(text: &str) -> Vec<Inline> {
    let mut nodes = Vec::new();
    let mut cursor = 0;

    for captures in bold_regex().captures_iter(text) {
        let (Some(whole), Some(content)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_code_spans(&mut nodes, &text[cursor..whole.start()]);
        nodes.push(Inline::Bold(vec![Inline::Text(content.as_str().to_string())]));
        cursor = whole.end();
    }

    push_code_spans(&mut nodes, &text[cursor..]);
    nodes
}

fn push_code_spans(nodes: &mut Vec<Inline>, fragment: &str) {
    let mut cursor = 0;

    for captures in inline_code_regex().captures_iter(fragment) {
        let (Some(whole), Some(content)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        push_text(nodes, &fragment[cursor..whole.start()]);
        nodes.push(Inline::InlineCode(content.as_str().to_string()));
        cursor = whole.end();
    }

    push_text(nodes, &fragment[cursor..]);
}

fn push_text(nodes: &mut Vec<Inline>, text: &str) {
    if !text.is_empty() {
        nodes.push(Inline::Text(text.to_string()));
    }
}
