use super::frame::{Rgb, Style};

/// Styles applied to each structural element of a rendered conversation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Palette {
    pub text: Style,
    pub heading: Style,
    pub subheading: Style,
    pub bold: Style,
    pub inline_code: Style,
    pub bullet: Style,
    pub code_border: Style,
    pub code_label: Style,
    pub user: Style,
    pub error: Style,
    pub muted: Style,
}

impl Palette {
    /// Green-on-black terminal look.
    #[must_use]
    pub fn hacker() -> Self {
        let green = Rgb(0, 255, 65);
        let dark_green = Rgb(0, 143, 17);
        Self {
            text: Style::fg(green),
            heading: Style::fg(green).bold(),
            subheading: Style::fg(green).bold(),
            bold: Style::default().bold(),
            inline_code: Style::fg(green).on(Rgb(0, 59, 0)),
            bullet: Style::fg(dark_green),
            code_border: Style::fg(green),
            code_label: Style::fg(green).bold(),
            user: Style::fg(green).on(Rgb(0, 26, 0)),
            error: Style::fg(Rgb(255, 64, 64)).bold(),
            muted: Style::fg(dark_green).dim(),
        }
    }

    /// Neutral look that keeps the terminal's own foreground for body text.
    #[must_use]
    pub fn modern() -> Self {
        Self {
            text: Style::default(),
            heading: Style::default().bold(),
            subheading: Style::fg(Rgb(75, 85, 99)).bold(),
            bold: Style::default().bold(),
            inline_code: Style::fg(Rgb(17, 24, 39)).on(Rgb(229, 231, 235)),
            bullet: Style::fg(Rgb(107, 114, 128)),
            code_border: Style::fg(Rgb(61, 61, 61)),
            code_label: Style::fg(Rgb(209, 213, 219)),
            user: Style::default().bold(),
            error: Style::fg(Rgb(220, 38, 38)).bold(),
            muted: Style::default().dim(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::hacker()
    }
}
