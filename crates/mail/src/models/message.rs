//! Message model representing a Gmail message in minimal projection

use super::{LabelId, ThreadId};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message (Gmail message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A message reduced to its identity and current labels.
///
/// Bodies and headers are never fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub label_ids: Vec<LabelId>,
}

impl Message {
    pub fn new(
        id: impl Into<MessageId>,
        thread_id: impl Into<ThreadId>,
        label_ids: Vec<LabelId>,
    ) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            label_ids,
        }
    }

    /// Whether the message currently carries the label
    pub fn has_label(&self, label: &LabelId) -> bool {
        self.label_ids.contains(label)
    }

    /// Attach a label; a label already present is left as is
    pub fn add_label(&mut self, label: &LabelId) {
        if !self.has_label(label) {
            self.label_ids.push(label.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_label_is_idempotent() {
        let mut msg = Message::new("m1", "t1", vec![LabelId::new("INBOX")]);
        let label = LabelId::new("Label_1");

        msg.add_label(&label);
        msg.add_label(&label);

        assert!(msg.has_label(&label));
        assert_eq!(msg.label_ids.len(), 2);
    }
}
