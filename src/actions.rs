//! # Quick Actions
//!
//! The closed set of one-tap rewrites offered by the keyboard. Each action
//! owns a fixed instruction; the user's text is quoted verbatim after it.

use crate::error::ProxyError;
use std::fmt;
use std::str::FromStr;

pub const INVALID_ACTION_MESSAGE: &str = "Invalid action";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAction {
    Shorten,
    Expand,
    Formal,
    Casual,
    Emojify,
    FixGrammar,
    Translate,
}

impl QuickAction {
    pub const ALL: [QuickAction; 7] = [
        QuickAction::Shorten,
        QuickAction::Expand,
        QuickAction::Formal,
        QuickAction::Casual,
        QuickAction::Emojify,
        QuickAction::FixGrammar,
        QuickAction::Translate,
    ];

    /// Name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuickAction::Shorten => "shorten",
            QuickAction::Expand => "expand",
            QuickAction::Formal => "formal",
            QuickAction::Casual => "casual",
            QuickAction::Emojify => "emojify",
            QuickAction::FixGrammar => "fix_grammar",
            QuickAction::Translate => "translate",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            QuickAction::Shorten => "Make this text shorter and more concise",
            QuickAction::Expand => "Expand this text with more detail",
            QuickAction::Formal => "Make this text more formal and professional",
            QuickAction::Casual => "Make this text more casual and friendly",
            QuickAction::Emojify => "Add relevant emojis to this text",
            QuickAction::FixGrammar => "Fix any grammar and spelling errors in this text",
            QuickAction::Translate => "Translate this text to English",
        }
    }

    /// Build the user message. `text` is inserted as-is, quotes included.
    pub fn render(&self, text: &str) -> String {
        format!("{}: \"{}\"", self.instruction(), text)
    }
}

impl FromStr for QuickAction {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuickAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ProxyError::Validation(INVALID_ACTION_MESSAGE.to_string()))
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
