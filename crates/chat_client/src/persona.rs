use million_chat::Palette;

pub const HACKER_INSTRUCTIONS: &str = "You are MILLION AI, an elite coding assistant provided by Million Corp. Output valid Markdown with code blocks. Be concise and technical.";
pub const MODERN_INSTRUCTIONS: &str =
    "You are MILLION AI, a helpful and expert AI assistant. Use Markdown formatted text.";

/// Assistant voice and look; selects both the system instruction and the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persona {
    #[default]
    Hacker,
    Modern,
}

impl Persona {
    /// Parses a persona id, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "hacker" => Some(Self::Hacker),
            "modern" => Some(Self::Modern),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Hacker => "hacker",
            Self::Modern => "modern",
        }
    }

    #[must_use]
    pub fn instructions(self) -> &'static str {
        match self {
            Self::Hacker => HACKER_INSTRUCTIONS,
            Self::Modern => MODERN_INSTRUCTIONS,
        }
    }

    #[must_use]
    pub fn palette(self) -> Palette {
        match self {
            Self::Hacker => Palette::hacker(),
            Self::Modern => Palette::modern(),
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Hacker => Self::Modern,
            Self::Modern => Self::Hacker,
        }
    }

    /// Banner shown above an empty conversation.
    #[must_use]
    pub fn greeting(self) -> &'static str {
        match self {
            Self::Hacker => "SYSTEM READY // AWAITING INPUT...",
            Self::Modern => "Million AI. How can I help you today?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_accepts_known_personas_case_insensitively() {
        assert_eq!(Persona::from_id(" Hacker "), Some(Persona::Hacker));
        assert_eq!(Persona::from_id("MODERN"), Some(Persona::Modern));
        assert_eq!(Persona::from_id("pirate"), None);
    }

    #[test]
    fn toggled_alternates_between_personas() {
        assert_eq!(Persona::Hacker.toggled(), Persona::Modern);
        assert_eq!(Persona::Modern.toggled().toggled(), Persona::Modern);
    }

    #[test]
    fn each_persona_carries_its_own_instructions() {
        assert!(Persona::Hacker.instructions().contains("elite coding assistant"));
        assert!(Persona::Modern.instructions().contains("Markdown formatted text"));
        assert_ne!(Persona::Hacker.palette(), Persona::Modern.palette());
    }
}
