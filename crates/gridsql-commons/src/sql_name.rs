//! Normalized SQL identifiers.
//!
//! Upstream display names are free-form ("Play Status (from Games)"); the
//! engine needs legal identifiers. `SqlName` carries the normalized form and
//! all catalog lookups compare these.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A snake_case SQL identifier derived from an upstream display name.
///
/// Normalization rules: lowercase, whitespace and dashes become underscores,
/// parentheses are stripped, case boundaries are split with an underscore,
/// every other character outside `[a-z0-9_]` is dropped, and underscore runs
/// are collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SqlName(String);

impl SqlName {
    /// Normalize an upstream display name into a SQL identifier.
    pub fn normalize(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        let mut prev_lower_or_digit = false;
        for ch in raw.chars() {
            if ch.is_ascii_alphanumeric() {
                if ch.is_ascii_uppercase() {
                    if prev_lower_or_digit {
                        out.push('_');
                    }
                    out.push(ch.to_ascii_lowercase());
                    prev_lower_or_digit = false;
                } else {
                    out.push(ch);
                    prev_lower_or_digit = true;
                }
            } else if ch.is_whitespace() || ch == '-' || ch == '_' {
                out.push('_');
                prev_lower_or_digit = false;
            } else {
                // Parentheses and any other punctuation are stripped.
                prev_lower_or_digit = false;
            }
        }

        let mut collapsed = String::with_capacity(out.len());
        let mut prev_underscore = true; // also trims leading underscores
        for ch in out.chars() {
            if ch == '_' {
                if !prev_underscore {
                    collapsed.push('_');
                }
                prev_underscore = true;
            } else {
                collapsed.push(ch);
                prev_underscore = false;
            }
        }
        while collapsed.ends_with('_') {
            collapsed.pop();
        }

        Self(collapsed)
    }

    /// Wrap a string that is already a normalized identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SqlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SqlName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
