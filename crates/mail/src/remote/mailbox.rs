//! Quota-gated access to a remote mailbox

use anyhow::Result;
use std::sync::Arc;

use super::{MailRemote, Status, ThreadPage};
use crate::models::{Label, Message, MessageId, ThreadId};
use crate::ratelimit::{QuotaCosts, RateLimiter};

/// A [`MailRemote`] bound to the shared rate limiter and status line.
///
/// Every call first records what it is about to do, then takes its
/// declared cost from the limiter, then hits the remote. Components that
/// issue remote calls borrow a `Mailbox` instead of the bare client.
pub struct Mailbox {
    remote: Arc<dyn MailRemote>,
    limiter: Arc<RateLimiter>,
    costs: QuotaCosts,
    status: Arc<Status>,
}

impl Mailbox {
    /// Create a mailbox charging calls against `limiter` using `costs`
    pub fn new(remote: Arc<dyn MailRemote>, limiter: Arc<RateLimiter>, costs: QuotaCosts) -> Self {
        Self {
            remote,
            limiter,
            costs,
            status: Arc::new(Status::new()),
        }
    }

    /// Report progress into an existing status line
    pub fn with_status(mut self, status: Arc<Status>) -> Self {
        self.status = status;
        self
    }

    pub fn costs(&self) -> &QuotaCosts {
        &self.costs
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn list_labels(&self) -> Result<Vec<Label>> {
        self.status.set("Label: retrieving list of labels");
        self.limiter.wait(self.costs.labels_list)?;
        self.remote.list_labels()
    }

    pub fn list_threads(
        &self,
        label: &Label,
        query: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        self.status
            .set(format!("Label {}: retrieving list of threads", label.name));
        self.limiter.wait(self.costs.threads_list)?;
        self.remote.list_threads(&label.id, query, page_token)
    }

    pub fn thread_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        self.status.set(format!(
            "Thread {}: retrieving list of messages",
            thread_id.as_str()
        ));
        self.limiter.wait(self.costs.threads_get)?;
        self.remote.thread_messages(thread_id)
    }

    pub fn add_label_to_thread(&self, thread_id: &ThreadId, label: &Label) -> Result<()> {
        self.status.set(format!(
            "Thread {}: adding label {}",
            thread_id.as_str(),
            label.name
        ));
        self.limiter.wait(self.costs.threads_modify)?;
        self.remote.add_label_to_thread(thread_id, &label.id)
    }

    pub fn add_label_to_messages(
        &self,
        thread_id: &ThreadId,
        message_ids: &[MessageId],
        label: &Label,
    ) -> Result<()> {
        let ids: Vec<&str> = message_ids.iter().map(|id| id.as_str()).collect();
        self.status.set(format!(
            "Thread {}: adding label {} (messages: {:?})",
            thread_id.as_str(),
            label.name,
            ids
        ));
        self.limiter.wait(self.costs.messages_batch_modify)?;
        self.remote.add_label_to_messages(message_ids, &label.id)
    }
}
