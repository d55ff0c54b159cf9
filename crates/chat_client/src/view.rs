//! Terminal presentation of conversations and the live redraw of a streaming reply.

use million_chat::render::wrap_spans;
use million_chat::{render_blocks, segment, Block, Line, RenderOptions, Span};
use session_store::{ConversationSummary, Message, Role};

const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";
const CLEAR_TO_END: &str = "\x1b[J";
const USER_MARKER: &str = "› ";

/// Lines for one stored message.
#[must_use]
pub fn message_lines(message: &Message, options: &RenderOptions) -> Vec<Line> {
    match message.role {
        Role::User => user_lines(message, options),
        Role::Assistant => reply_lines(&segment(&message.text), message.failed, options),
    }
}

/// Lines for an assistant reply, given its block tree.
#[must_use]
pub fn reply_lines(blocks: &[Block], failed: bool, options: &RenderOptions) -> Vec<Line> {
    let mut lines = Vec::new();
    if failed {
        lines.push(Line::new(vec![Span::new(
            "✗ reply failed",
            options.palette.error,
        )]));
    }
    lines.extend(render_blocks(blocks, options));
    lines
}

fn user_lines(message: &Message, options: &RenderOptions) -> Vec<Line> {
    let palette = &options.palette;
    let marker = [Span::new(USER_MARKER, palette.user)];
    let indent = [Span::plain(" ".repeat(USER_MARKER.chars().count()))];
    let mut lines = Vec::new();

    for (index, text_line) in message.text.lines().enumerate() {
        let first = if index == 0 { &marker[..] } else { &indent[..] };
        lines.extend(wrap_spans(
            &[Span::new(text_line, palette.user)],
            options.width,
            first,
            &indent,
        ));
    }
    for attachment in &message.attachments {
        lines.push(Line::new(vec![
            Span::plain(" ".repeat(USER_MARKER.chars().count())),
            Span::new(
                format!("[{}] {}", attachment.kind.label(), attachment.name),
                palette.muted,
            ),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::new(marker.to_vec()));
    }
    lines
}

/// One index row: short id, title, message count.
#[must_use]
pub fn summary_line(summary: &ConversationSummary, active: bool, options: &RenderOptions) -> Line {
    let short_id: String = summary.id.chars().take(8).collect();
    let marker = if active { "* " } else { "  " };
    Line::new(vec![
        Span::new(marker, options.palette.bullet),
        Span::new(short_id, options.palette.muted),
        Span::plain("  "),
        Span::new(summary.title.clone(), options.palette.text),
        Span::new(
            format!("  ({} messages)", summary.message_count),
            options.palette.muted,
        ),
    ])
}

/// Serialises lines for the terminal, with or without ANSI styling.
#[must_use]
pub fn encode_lines(lines: &[Line], color: bool) -> Vec<String> {
    lines
        .iter()
        .map(|line| if color { line.to_ansi() } else { line.to_plain() })
        .collect()
}

/// Redraws a growing block of lines in place, rewriting only from the first changed line.
///
/// The cursor is assumed to sit at the start of the line below the last drawn line.
/// Lines that scrolled above the viewport cannot be reached and are left as drawn.
#[derive(Debug)]
pub struct LiveView {
    drawn: Vec<String>,
    height: usize,
}

impl LiveView {
    #[must_use]
    pub fn new(height: usize) -> Self {
        Self {
            drawn: Vec::new(),
            height: height.max(1),
        }
    }

    /// Returns the bytes that turn the previous frame into `lines`.
    pub fn update(&mut self, lines: &[String]) -> String {
        let first_changed = self
            .drawn
            .iter()
            .zip(lines)
            .position(|(old, new)| old != new)
            .unwrap_or_else(|| self.drawn.len().min(lines.len()));

        if first_changed == self.drawn.len() && first_changed == lines.len() {
            return String::new();
        }

        let viewport_top = self.drawn.len().saturating_sub(self.height);
        let start = first_changed.max(viewport_top);

        let mut buffer = String::from(SYNC_START);
        let up = self.drawn.len() - start;
        if up > 0 {
            buffer.push_str(&format!("\x1b[{up}A"));
        }
        buffer.push('\r');
        buffer.push_str(CLEAR_TO_END);
        for line in lines.get(start..).unwrap_or_default() {
            buffer.push_str(line);
            buffer.push_str("\r\n");
        }
        buffer.push_str(SYNC_END);

        self.drawn = lines.to_vec();
        buffer
    }

    /// Forgets the drawn frame; the next update starts below it.
    pub fn finish(&mut self) {
        self.drawn.clear();
    }

    #[must_use]
    pub fn drawn_len(&self) -> usize {
        self.drawn.len()
    }
}
