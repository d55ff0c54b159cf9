use std::slice;

use crate::markdown::{Block, Inline, ListKind};

use super::frame::{Line, Span, Style};
use super::highlight::highlight_code;
use super::palette::Palette;
use super::wrap::{text_width, wrap_spans};

const MIN_WIDTH: usize = 8;
const LIST_INDENT: &str = "  ";
const CODE_GUTTER: &str = "│ ";

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub width: usize,
    pub palette: Palette,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            palette: Palette::default(),
        }
    }
}

/// Lays out a block sequence as terminal lines no wider than `options.width`.
#[must_use]
pub fn render_blocks(blocks: &[Block], options: &RenderOptions) -> Vec<Line> {
    let width = options.width.max(MIN_WIDTH);
    let mut lines = Vec::new();

    for block in blocks {
        match block {
            Block::Code { language, code } => {
                render_code(&mut lines, language.as_deref(), code, width, &options.palette)
            }
            Block::Prose(nodes) => {
                for node in nodes {
                    render_prose_line(&mut lines, node, width, &options.palette);
                }
            }
        }
    }

    lines
}

fn render_prose_line(lines: &mut Vec<Line>, node: &Inline, width: usize, palette: &Palette) {
    match node {
        Inline::Heading { level, children } => {
            let style = if *level <= 2 {
                palette.heading
            } else {
                palette.subheading
            };
            let spans = inline_spans(children, palette.text.patch(style), palette);
            lines.extend(wrap_spans(&spans, width, &[], &[]));
        }
        Inline::ListItem { kind, children } => {
            let marker = match kind {
                ListKind::Unordered => "• ".to_string(),
                ListKind::Ordered(number) => format!("{number}. "),
            };
            let hanging = " ".repeat(text_width(LIST_INDENT) + text_width(&marker));
            let first_prefix = [Span::plain(LIST_INDENT), Span::new(marker, palette.bullet)];
            let spans = inline_spans(children, palette.text, palette);
            lines.extend(wrap_spans(
                &spans,
                width,
                &first_prefix,
                &[Span::plain(hanging)],
            ));
        }
        Inline::Paragraph(children) => {
            let spans = inline_spans(children, palette.text, palette);
            lines.extend(wrap_spans(&spans, width, &[], &[]));
        }
        Inline::Break => lines.push(Line::blank()),
        Inline::Text(_) | Inline::Bold(_) | Inline::InlineCode(_) => {
            let spans = inline_spans(slice::from_ref(node), palette.text, palette);
            lines.extend(wrap_spans(&spans, width, &[], &[]));
        }
    }
}

fn inline_spans(nodes: &[Inline], base: Style, palette: &Palette) -> Vec<Span> {
    let mut spans = Vec::new();
    collect_inline_spans(nodes, base, palette, &mut spans);
    spans
}

fn collect_inline_spans(nodes: &[Inline], base: Style, palette: &Palette, out: &mut Vec<Span>) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push(Span::new(text.clone(), base)),
            Inline::Bold(children) => {
                collect_inline_spans(children, base.patch(palette.bold), palette, out)
            }
            Inline::InlineCode(code) => {
                out.push(Span::new(code.clone(), base.patch(palette.inline_code)))
            }
            Inline::Heading { children, .. }
            | Inline::ListItem { children, .. }
            | Inline::Paragraph(children) => collect_inline_spans(children, base, palette, out),
            Inline::Break => {}
        }
    }
}

fn render_code(
    lines: &mut Vec<Line>,
    language: Option<&str>,
    code: &str,
    width: usize,
    palette: &Palette,
) {
    let label = language.unwrap_or(Block::UNSPECIFIED_LANGUAGE);
    let used = text_width("┌─ ") + text_width(label) + 1;
    let mut header = Line::new(vec![
        Span::new("┌─ ", palette.code_border),
        Span::new(label, palette.code_label),
        Span::new(" ", palette.code_border),
    ]);
    header.push(Span::new(
        "─".repeat(width.saturating_sub(used)),
        palette.code_border,
    ));
    lines.push(header);

    let gutter = [Span::new(CODE_GUTTER, palette.code_border)];
    for code_line in highlight_code(code, language) {
        lines.extend(wrap_spans(&code_line, width, &gutter, &gutter));
    }

    lines.push(Line::new(vec![Span::new(
        format!("└{}", "─".repeat(width - 1)),
        palette.code_border,
    )]));
}
