//! Width measurement and hard wrapping of styled spans.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::frame::{Line, Span};

const TAB_WIDTH: usize = 4;

fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Visible width of unstyled text, with tabs counted as [`TAB_WIDTH`] columns.
pub fn text_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

/// Lays `spans` out on as many lines as needed to stay within `width` columns.
///
/// The first line starts with `first_prefix`, continuation lines with `rest_prefix`.
/// Every line carries at least one grapheme of content, so a prefix wider than
/// `width` cannot stall the layout. Tabs are expanded to spaces.
pub fn wrap_spans(
    spans: &[Span],
    width: usize,
    first_prefix: &[Span],
    rest_prefix: &[Span],
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::new(first_prefix.to_vec());
    let mut used = current.width();
    let mut has_content = false;

    for span in spans {
        let mut chunk = String::new();

        for grapheme in span.as_str().graphemes(true) {
            let grapheme_cols = grapheme_width(grapheme);
            if has_content && used + grapheme_cols > width {
                current.push(Span::new(std::mem::take(&mut chunk), span.style()));
                lines.push(std::mem::replace(
                    &mut current,
                    Line::new(rest_prefix.to_vec()),
                ));
                used = current.width();
                has_content = false;
            }

            if grapheme == "\t" {
                chunk.push_str(&" ".repeat(TAB_WIDTH));
            } else {
                chunk.push_str(grapheme);
            }
            used += grapheme_cols;
            has_content = true;
        }

        current.push(Span::new(chunk, span.style()));
    }

    lines.push(current);
    lines
}
