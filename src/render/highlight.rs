//! Syntax highlighting for fenced code blocks.

use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, Style as SyntectStyle, Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use super::frame::{Rgb, Span, Style};

const THEME_NAME: &str = "base16-ocean.dark";

fn syntax_set() -> &'static SyntaxSet {
    static CACHED: OnceLock<SyntaxSet> = OnceLock::new();
    CACHED.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    static CACHED: OnceLock<Theme> = OnceLock::new();
    CACHED.get_or_init(|| {
        let mut themes = ThemeSet::load_defaults();
        themes.themes.remove(THEME_NAME).unwrap_or_default()
    })
}

/// Loads the syntax and theme sets so the first highlighted block renders without
/// a visible stall. Safe to call from a background thread.
pub fn prewarm_code_highlighting() {
    let _ = syntax_set();
    let _ = theme();
}

/// Highlights `code` line by line. Unknown or missing languages fall back to plain
/// text; highlighter errors degrade the affected line to an unstyled span.
pub fn highlight_code(code: &str, language: Option<&str>) -> Vec<Vec<Span>> {
    let syntaxes = syntax_set();
    let syntax = language
        .and_then(|token| syntaxes.find_syntax_by_token(token))
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme());

    LinesWithEndings::from(code)
        .map(|line| match highlighter.highlight_line(line, syntaxes) {
            Ok(ranges) => ranges
                .into_iter()
                .map(|(style, text)| (convert_style(style), strip_line_ending(text)))
                .filter(|(_, text)| !text.is_empty())
                .map(|(style, text)| Span::new(text, style))
                .collect(),
            Err(error) => {
                tracing::debug!(%error, language, "code highlighting failed; rendering plain line");
                vec![Span::plain(strip_line_ending(line))]
            }
        })
        .collect()
}

fn convert_style(style: SyntectStyle) -> Style {
    let color = style.foreground;
    Style {
        fg: Some(Rgb(color.r, color.g, color.b)),
        bg: None,
        bold: style.font_style.contains(FontStyle::BOLD),
        italic: style.font_style.contains(FontStyle::ITALIC),
        dim: false,
    }
}

fn strip_line_ending(text: &str) -> &str {
    text.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::highlight_code;

    fn plain_lines(code: &str, language: Option<&str>) -> Vec<String> {
        highlight_code(code, language)
            .iter()
            .map(|spans| spans.iter().map(|span| span.as_str()).collect())
            .collect()
    }

    #[test]
    fn highlighting_preserves_text_per_line() {
        let code = "fn main() {\n    println!(\"hi\");\n}\n";
        assert_eq!(
            plain_lines(code, Some("rust")),
            vec!["fn main() {", "    println!(\"hi\");", "}"]
        );
    }

    #[test]
    fn known_language_gets_colored_spans() {
        let lines = highlight_code("let x = 1;\n", Some("rs"));
        assert!(lines[0].iter().all(|span| span.style().fg.is_some()));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        assert_eq!(
            plain_lines("whatever\n", Some("no-such-lang")),
            vec!["whatever"]
        );
        assert_eq!(plain_lines("x", None), vec!["x"]);
    }

    #[test]
    fn empty_code_has_no_lines() {
        assert!(highlight_code("", Some("rust")).is_empty());
    }
}
