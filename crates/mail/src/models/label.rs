//! Label model representing a Gmail label

use serde::{Deserialize, Serialize};

/// Unique identifier for a label (Gmail label ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelId(pub String);

impl LabelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Well-known Gmail system labels
    pub const CHAT: &'static str = "CHAT";
    pub const SENT: &'static str = "SENT";
    pub const INBOX: &'static str = "INBOX";
    pub const IMPORTANT: &'static str = "IMPORTANT";
    pub const TRASH: &'static str = "TRASH";
    pub const DRAFT: &'static str = "DRAFT";
    pub const SPAM: &'static str = "SPAM";
    pub const CATEGORY_FORUMS: &'static str = "CATEGORY_FORUMS";
    pub const CATEGORY_UPDATES: &'static str = "CATEGORY_UPDATES";
    pub const CATEGORY_PERSONAL: &'static str = "CATEGORY_PERSONAL";
    pub const CATEGORY_PROMOTIONS: &'static str = "CATEGORY_PROMOTIONS";
    pub const CATEGORY_SOCIAL: &'static str = "CATEGORY_SOCIAL";
    pub const STARRED: &'static str = "STARRED";
    pub const UNREAD: &'static str = "UNREAD";

    /// The closed set of system label ids
    pub const SYSTEM: [&'static str; 14] = [
        Self::CHAT,
        Self::SENT,
        Self::INBOX,
        Self::IMPORTANT,
        Self::TRASH,
        Self::DRAFT,
        Self::SPAM,
        Self::CATEGORY_FORUMS,
        Self::CATEGORY_UPDATES,
        Self::CATEGORY_PERSONAL,
        Self::CATEGORY_PROMOTIONS,
        Self::CATEGORY_SOCIAL,
        Self::STARRED,
        Self::UNREAD,
    ];

    /// Prefix Gmail gives to user-defined label ids
    pub const USER_PREFIX: &'static str = "Label_";

    /// Whether the id belongs to the system enumeration
    pub fn is_system(&self) -> bool {
        Self::SYSTEM.contains(&self.as_str())
    }

    /// Whether the id carries the user label prefix
    pub fn has_user_prefix(&self) -> bool {
        self.0.starts_with(Self::USER_PREFIX)
    }

    /// Whether the id is neither a known system label nor a user label
    pub fn is_unrecognized(&self) -> bool {
        !self.is_system() && !self.has_user_prefix()
    }
}

impl From<String> for LabelId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LabelId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Origin of a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    System,
    User,
}

impl LabelKind {
    /// Classify a label id.
    ///
    /// Ids outside the system enumeration count as user labels, even
    /// without the user prefix, so that system labels Gmail adds later
    /// are relabeled rather than silently skipped.
    pub fn classify(id: &LabelId) -> Self {
        if id.is_system() {
            LabelKind::System
        } else {
            LabelKind::User
        }
    }
}

/// A mail label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label ID (e.g., "INBOX", "Label_123")
    pub id: LabelId,
    /// Display name
    pub name: String,
    /// System or user label
    pub kind: LabelKind,
}

impl Label {
    /// Create a label, classifying it from its id
    pub fn new(id: impl Into<LabelId>, name: impl Into<String>) -> Self {
        let id = id.into();
        let kind = LabelKind::classify(&id);
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn is_user(&self) -> bool {
        self.kind == LabelKind::User
    }
}
