//! Type-safe wrappers for upstream identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type-safe wrapper for an upstream base identifier.
///
/// Ensures base ids cannot be accidentally used where table ids or display
/// names are expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaseId(String);

impl BaseId {
    /// Creates a new BaseId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the base id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BaseId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Type-safe wrapper for an upstream table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId(String);

impl TableId {
    /// Creates a new TableId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the table id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TableId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TableId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
