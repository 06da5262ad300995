#![forbid(unsafe_code)]

//! Interaction contexts.
//!
//! The active context selects which intent and response tables apply. It is
//! changed only by an explicit user action, never by classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The mode the user is working in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// Drafting text.
    Writing,
    /// Generating and sorting ideas.
    Brainstorming,
    /// Studying a topic.
    Learning,
    /// Weighing options.
    Decision,
    /// No specialised mode.
    #[default]
    General,
}

impl Context {
    /// Every context, in presentation order.
    pub const ALL: [Context; 5] = [
        Context::Writing,
        Context::Brainstorming,
        Context::Learning,
        Context::Decision,
        Context::General,
    ];

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Brainstorming => "brainstorming",
            Self::Learning => "learning",
            Self::Decision => "decision",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown context name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContextError(String);

impl fmt::Display for ParseContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown context {:?} (expected writing, brainstorming, learning, decision or general)",
            self.0
        )
    }
}

impl std::error::Error for ParseContextError {}

impl FromStr for Context {
    type Err = ParseContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| ParseContextError(s.to_string()))
    }
}
