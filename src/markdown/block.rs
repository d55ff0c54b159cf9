use super::inline::classify_line;
use super::Block;

const FENCE: &str = "```";
const MAX_LANGUAGE_TAG_CHARS: usize = 20;

/// Splits `text` into fenced code blocks and prose blocks, in source order.
///
/// A fence opens on a line that starts with exactly three backticks and closes on a
/// later line consisting of exactly three backticks. An opening fence with no closing
/// line after it is prose: a fence that is still being streamed never turns into a
/// code block until its closing line arrives.
#[must_use]
pub fn segment(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut blocks = Vec::new();
    let mut prose_start = 0;
    let mut index = 0;

    while index < lines.len() {
        let Some(info) = opening_fence_info(lines[index]) else {
            index += 1;
            continue;
        };

        let Some(close) = (index + 1..lines.len()).find(|&line| is_closing_fence(lines[line]))
        else {
            // Every later fence line would have closed this one, so the rest is prose.
            break;
        };

        push_prose(&mut blocks, &lines[prose_start..index]);
        blocks.push(code_block(info, &lines[index + 1..close]));
        index = close + 1;
        prose_start = index;
    }

    push_prose(&mut blocks, &lines[prose_start..]);
    blocks
}

fn push_prose(blocks: &mut Vec<Block>, lines: &[&str]) {
    if lines.is_empty() {
        return;
    }

    let nodes = lines
        .iter()
        .map(|line| classify_line(strip_line_ending(line)))
        .collect();
    blocks.push(Block::Prose(nodes));
}

fn code_block(info: &str, body: &[&str]) -> Block {
    let mut code = String::new();

    let language = if is_language_tag(info) {
        Some(info.to_string())
    } else {
        if !info.is_empty() {
            code.push_str(info);
            code.push('\n');
        }
        None
    };

    for line in body {
        code.push_str(line);
    }

    Block::Code { language, code }
}

fn is_language_tag(tag: &str) -> bool {
    !tag.is_empty()
        && !tag.chars().any(char::is_whitespace)
        && tag.chars().count() < MAX_LANGUAGE_TAG_CHARS
}

/// Returns the text after the backticks when `line` opens a fence.
fn opening_fence_info(line: &str) -> Option<&str> {
    let rest = strip_line_ending(line).strip_prefix(FENCE)?;
    if rest.starts_with('`') {
        return None;
    }
    Some(rest)
}

fn is_closing_fence(line: &str) -> bool {
    strip_line_ending(line) == FENCE
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
