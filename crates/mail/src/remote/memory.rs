//! In-memory remote mailbox
//!
//! Used for testing and dry runs without network access. Every call is
//! logged so tests can assert exactly which remote operations were issued.

use anyhow::{Result, anyhow};
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use super::{MailRemote, ThreadPage};
use crate::models::{Label, LabelId, Message, MessageId, ThreadId, ThreadRef};

/// Default number of threads per listing page
const DEFAULT_PAGE_SIZE: usize = 100;

/// A remote operation as observed by [`InMemoryRemote`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    ListLabels,
    ListThreads {
        label_id: LabelId,
        query: Option<String>,
        page_token: Option<String>,
    },
    ThreadMessages(ThreadId),
    AddLabelToThread(ThreadId, LabelId),
    AddLabelToMessages(Vec<MessageId>, LabelId),
}

impl RemoteCall {
    /// Whether the call mutates label state
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            RemoteCall::AddLabelToThread(..) | RemoteCall::AddLabelToMessages(..)
        )
    }
}

struct ThreadEntry {
    id: ThreadId,
    /// Labels the thread is listed under
    listed_under: Vec<LabelId>,
    messages: Vec<Message>,
}

#[derive(Default)]
struct Failures {
    thread_messages: HashSet<ThreadId>,
    writes: HashSet<ThreadId>,
    /// (label, zero-based page index)
    pages: HashSet<(LabelId, usize)>,
}

/// In-memory implementation of MailRemote
///
/// Threads are listed in insertion order, `page_size` at a time, under
/// every label they were registered with or that any of their messages
/// carries.
pub struct InMemoryRemote {
    labels: RwLock<Vec<Label>>,
    threads: RwLock<Vec<ThreadEntry>>,
    calls: RwLock<Vec<RemoteCall>>,
    failures: RwLock<Failures>,
    page_size: usize,
}

impl InMemoryRemote {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Create an empty mailbox listing `page_size` threads per page
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            labels: RwLock::new(Vec::new()),
            threads: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            failures: RwLock::new(Failures::default()),
            page_size: page_size.max(1),
        }
    }

    pub fn add_label(&self, label: Label) {
        write(&self.labels).push(label);
    }

    /// Register a thread listed under `listed_under` with the given messages
    pub fn add_thread(&self, id: impl Into<ThreadId>, listed_under: &[&str], messages: Vec<Message>) {
        write(&self.threads).push(ThreadEntry {
            id: id.into(),
            listed_under: listed_under.iter().map(|l| LabelId::new(*l)).collect(),
            messages,
        });
    }

    /// Make fetching this thread's messages fail
    pub fn fail_thread_messages(&self, id: impl Into<ThreadId>) {
        write(&self.failures).thread_messages.insert(id.into());
    }

    /// Make label writes touching this thread fail
    pub fn fail_writes(&self, id: impl Into<ThreadId>) {
        write(&self.failures).writes.insert(id.into());
    }

    /// Make fetching the given page of a label's listing fail
    pub fn fail_page(&self, label_id: impl Into<LabelId>, page: usize) {
        write(&self.failures).pages.insert((label_id.into(), page));
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        read(&self.calls).clone()
    }

    /// Number of label-mutating calls received
    pub fn write_count(&self) -> usize {
        read(&self.calls).iter().filter(|c| c.is_write()).count()
    }

    /// Current messages of a thread
    pub fn messages(&self, id: &ThreadId) -> Vec<Message> {
        read(&self.threads)
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.messages.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: RemoteCall) {
        write(&self.calls).push(call);
    }

    fn check_write(&self, id: &ThreadId) -> Result<()> {
        if read(&self.failures).writes.contains(id) {
            return Err(anyhow!("Injected write failure for thread {}", id.as_str()));
        }
        Ok(())
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MailRemote for InMemoryRemote {
    fn list_labels(&self) -> Result<Vec<Label>> {
        self.record(RemoteCall::ListLabels);
        Ok(read(&self.labels).clone())
    }

    fn list_threads(
        &self,
        label_id: &LabelId,
        query: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        self.record(RemoteCall::ListThreads {
            label_id: label_id.clone(),
            query: query.map(str::to_string),
            page_token: page_token.map(str::to_string),
        });

        let start = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| anyhow!("Invalid page token: {}", token))?,
            None => 0,
        };
        let page = start / self.page_size;
        if read(&self.failures)
            .pages
            .contains(&(label_id.clone(), page))
        {
            return Err(anyhow!(
                "Injected listing failure for {} page {}",
                label_id,
                page
            ));
        }

        let matching: Vec<ThreadRef> = read(&self.threads)
            .iter()
            .filter(|t| {
                t.listed_under.contains(label_id)
                    || t.messages.iter().any(|m| m.has_label(label_id))
            })
            .map(|t| ThreadRef::new(t.id.clone()))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let threads = matching.get(start..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(ThreadPage {
            threads,
            next_page_token,
        })
    }

    fn thread_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        self.record(RemoteCall::ThreadMessages(thread_id.clone()));
        if read(&self.failures).thread_messages.contains(thread_id) {
            return Err(anyhow!(
                "Injected failure fetching thread {}",
                thread_id.as_str()
            ));
        }
        read(&self.threads)
            .iter()
            .find(|t| &t.id == thread_id)
            .map(|t| t.messages.clone())
            .ok_or_else(|| anyhow!("Thread not found: {}", thread_id.as_str()))
    }

    fn add_label_to_thread(&self, thread_id: &ThreadId, label_id: &LabelId) -> Result<()> {
        self.record(RemoteCall::AddLabelToThread(
            thread_id.clone(),
            label_id.clone(),
        ));
        self.check_write(thread_id)?;

        let mut threads = write(&self.threads);
        let entry = threads
            .iter_mut()
            .find(|t| &t.id == thread_id)
            .ok_or_else(|| anyhow!("Thread not found: {}", thread_id.as_str()))?;
        for message in &mut entry.messages {
            message.add_label(label_id);
        }
        Ok(())
    }

    fn add_label_to_messages(&self, message_ids: &[MessageId], label_id: &LabelId) -> Result<()> {
        self.record(RemoteCall::AddLabelToMessages(
            message_ids.to_vec(),
            label_id.clone(),
        ));

        let mut threads = write(&self.threads);
        for entry in threads.iter_mut() {
            let touched = entry.messages.iter().any(|m| message_ids.contains(&m.id));
            if touched {
                self.check_write(&entry.id)?;
            }
        }
        for message in threads.iter_mut().flat_map(|t| t.messages.iter_mut()) {
            if message_ids.contains(&message.id) {
                message.add_label(label_id);
            }
        }
        Ok(())
    }
}

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(id: &str, thread: &str, labels: &[&str]) -> Message {
        Message::new(id, thread, labels.iter().map(|l| LabelId::new(*l)).collect())
    }

    #[test]
    fn test_pages_follow_tokens() {
        let remote = InMemoryRemote::with_page_size(2);
        for i in 0..5 {
            remote.add_thread(format!("t{i}"), &["Label_1"], vec![]);
        }
        let label = LabelId::new("Label_1");

        let first = remote.list_threads(&label, None, None).unwrap();
        assert_eq!(first.threads.len(), 2);
        let token = first.next_page_token.unwrap();

        let second = remote.list_threads(&label, None, Some(&token)).unwrap();
        let third = remote
            .list_threads(&label, None, second.next_page_token.as_deref())
            .unwrap();
        assert_eq!(third.threads, vec![ThreadRef::new("t4")]);
        assert_eq!(third.next_page_token, None);
    }

    #[test]
    fn test_threads_listed_by_message_labels() {
        let remote = InMemoryRemote::new();
        remote.add_thread("t1", &[], vec![labeled("m1", "t1", &["Label_1"])]);
        remote.add_thread("t2", &[], vec![labeled("m2", "t2", &["INBOX"])]);

        let page = remote
            .list_threads(&LabelId::new("Label_1"), None, None)
            .unwrap();
        assert_eq!(page.threads, vec![ThreadRef::new("t1")]);
    }

    #[test]
    fn test_add_label_to_thread_labels_all_messages() {
        let remote = InMemoryRemote::new();
        remote.add_thread(
            "t1",
            &["Label_1"],
            vec![labeled("m1", "t1", &[]), labeled("m2", "t1", &["INBOX"])],
        );
        let label = LabelId::new("Label_1");

        remote
            .add_label_to_thread(&ThreadId::new("t1"), &label)
            .unwrap();

        assert!(remote
            .messages(&ThreadId::new("t1"))
            .iter()
            .all(|m| m.has_label(&label)));
        assert_eq!(remote.write_count(), 1);
    }

    #[test]
    fn test_injected_write_failure() {
        let remote = InMemoryRemote::new();
        remote.add_thread("t1", &["Label_1"], vec![labeled("m1", "t1", &[])]);
        remote.fail_writes("t1");

        let result = remote.add_label_to_messages(&[MessageId::new("m1")], &LabelId::new("Label_1"));

        assert!(result.is_err());
        assert!(remote.messages(&ThreadId::new("t1"))[0].label_ids.is_empty());
    }
}
