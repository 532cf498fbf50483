//! Thread model representing a Gmail thread (conversation)

use serde::{Deserialize, Serialize};

/// Unique identifier for a thread (Gmail thread ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A thread as returned by a listing.
///
/// Listings only carry the identity; the messages are fetched on demand
/// when the thread is reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRef {
    pub id: ThreadId,
}

impl ThreadRef {
    pub fn new(id: impl Into<ThreadId>) -> Self {
        Self { id: id.into() }
    }
}
