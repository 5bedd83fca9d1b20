//! The suggestion data model.
//!
//! A [`Suggestion`] pairs an executable shell command with a technical
//! explanation of what it does. Suggestions are produced only by parsing
//! model output; parsing is fallible and never panics.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate shell command paired with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub command: String,
    pub explanation: String,
}

impl Suggestion {
    /// Parses a suggestion from a JSON object with `command` and
    /// `explanation` keys.
    ///
    /// Returns an error for invalid JSON or missing keys; callers decide
    /// whether that is fatal.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| anyhow!("not a valid suggestion object: {e}"))
    }
}

impl fmt::Display for Suggestion {
    /// Renders the suggestion as a single JSON line, the format used when
    /// feeding discarded suggestions back into a prompt.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::json!({
            "command": self.command,
            "explanation": self.explanation,
        });
        write!(f, "{json}")
    }
}

/// Removes suggestions whose command text was already seen, keeping the
/// first occurrence of each. Equality is exact string match, no
/// normalization.
pub fn dedupe(suggestions: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut seen = std::collections::HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.command.clone()))
        .collect()
}
