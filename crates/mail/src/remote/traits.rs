//! Remote capability trait definitions

use crate::models::{Label, LabelId, Message, MessageId, ThreadId, ThreadRef};
use anyhow::Result;

/// One page of a thread listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadPage {
    pub threads: Vec<ThreadRef>,
    /// Continuation token; `None` on the last page
    pub next_page_token: Option<String>,
}

/// Label, thread and message operations of a remote mailbox
///
/// Implementations perform exactly one remote call per method. Quota
/// accounting and retries are left to the caller.
pub trait MailRemote: Send + Sync {
    /// List every label in the mailbox
    fn list_labels(&self) -> Result<Vec<Label>>;

    /// List one page of threads carrying the label and matching the query
    fn list_threads(
        &self,
        label_id: &LabelId,
        query: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ThreadPage>;

    /// Get the messages of a thread (id and label ids only)
    fn thread_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>>;

    /// Add a label to every message of a thread
    fn add_label_to_thread(&self, thread_id: &ThreadId, label_id: &LabelId) -> Result<()>;

    /// Add a label to a batch of messages
    fn add_label_to_messages(&self, message_ids: &[MessageId], label_id: &LabelId) -> Result<()>;
}
