//! Intent resolution over transcribed text
//!
//! One built-in rule: a weather question names a city. Anything else is
//! answered directly.

use regex::Regex;

/// What the sender asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A weather question for the named city
    Weather {
        /// Single-word city token extracted from the question
        city: String,
    },
    /// Anything else: answer the transcription directly
    Direct,
}

/// Resolves a transcription to an [`Intent`]
pub struct IntentResolver {
    weather: Regex,
}

impl IntentResolver {
    /// Create a resolver with the built-in weather rule
    #[must_use]
    pub fn new() -> Self {
        Self {
            // Matches anywhere in the text, case-insensitive
            weather: Regex::new(r"(?i)what\s+is\s+the\s+weather\s+like\s+in\s+(\w+)")
                .expect("weather pattern is valid"),
        }
    }

    /// Resolve `text` to an intent
    #[must_use]
    pub fn resolve(&self, text: &str) -> Intent {
        match self.weather.captures(text) {
            Some(captures) => Intent::Weather {
                city: captures[1].to_string(),
            },
            None => Intent::Direct,
        }
    }
}

impl Default for IntentResolver {
    fn default() -> Self {
        Self::new()
    }
}
