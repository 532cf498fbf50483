//! Per-thread label reconciliation

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::strategy::{Strategy, choose_strategy};
use crate::models::{Label, LabelId, Message, MessageId, ThreadId, ThreadRef};
use crate::remote::Mailbox;

/// What happened to a thread's label state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// Nothing was missing
    Unchanged,
    /// The write was issued and acknowledged
    Applied,
    /// The write was decided but suppressed
    DryRun,
}

/// Result of reconciling one thread against one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadOutcome {
    pub thread_id: ThreadId,
    pub label_id: LabelId,
    /// Messages returned for the thread
    pub messages_considered: usize,
    /// Messages that lacked the label
    pub missing: Vec<MessageId>,
    pub strategy: Strategy,
    pub disposition: Disposition,
}

/// Ids of the messages not carrying `label`, in thread order
pub fn missing_label(messages: &[Message], label: &LabelId) -> Vec<MessageId> {
    messages
        .iter()
        .filter(|m| !m.has_label(label))
        .map(|m| m.id.clone())
        .collect()
}

/// Brings every message of a thread up to a target label
pub struct Reconciler<'a> {
    mailbox: &'a Mailbox,
    dry_run: bool,
}

impl<'a> Reconciler<'a> {
    pub fn new(mailbox: &'a Mailbox, dry_run: bool) -> Self {
        Self { mailbox, dry_run }
    }

    /// Fetch the thread's messages and add `label` to those lacking it.
    ///
    /// At most one write is issued. In dry-run mode the decision is made
    /// and reported the same way, but nothing is written.
    pub fn reconcile(&self, thread: &ThreadRef, label: &Label) -> Result<ThreadOutcome> {
        let messages = self.mailbox.thread_messages(&thread.id).with_context(|| {
            format!("Failed to get messages of thread {}", thread.id.as_str())
        })?;
        let missing = missing_label(&messages, &label.id);
        info!(
            "|- thread: {}, un/labeled messages {:>2}/{:<2}",
            thread.id.as_str(),
            missing.len(),
            messages.len()
        );

        let costs = self.mailbox.costs();
        let strategy = choose_strategy(
            costs.threads_modify,
            costs.messages_batch_modify,
            !missing.is_empty(),
        );

        let disposition = match strategy {
            Strategy::None => Disposition::Unchanged,
            _ if self.dry_run => {
                match strategy {
                    Strategy::WholeThread => debug!(
                        " |- thread {}: re-label {}",
                        thread.id.as_str(),
                        label.name
                    ),
                    _ => debug!(
                        " |- thread {}: messages {:?}",
                        thread.id.as_str(),
                        missing.iter().map(MessageId::as_str).collect::<Vec<_>>()
                    ),
                }
                Disposition::DryRun
            }
            Strategy::WholeThread => {
                self.mailbox
                    .add_label_to_thread(&thread.id, label)
                    .with_context(|| {
                        format!(
                            "Failed to add label {} to thread {}",
                            label.name,
                            thread.id.as_str()
                        )
                    })?;
                Disposition::Applied
            }
            Strategy::MessageBatch => {
                self.mailbox
                    .add_label_to_messages(&thread.id, &missing, label)
                    .with_context(|| {
                        format!(
                            "Failed to add label {} to {} messages of thread {}",
                            label.name,
                            missing.len(),
                            thread.id.as_str()
                        )
                    })?;
                Disposition::Applied
            }
        };

        Ok(ThreadOutcome {
            thread_id: thread.id.clone(),
            label_id: label.id.clone(),
            messages_considered: messages.len(),
            missing,
            strategy,
            disposition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{ManualClock, QuotaCosts, RateLimiter};
    use crate::remote::{InMemoryRemote, RemoteCall};
    use std::sync::Arc;

    const PROJECT: &str = "Label_7";

    fn mailbox(remote: Arc<InMemoryRemote>, costs: QuotaCosts) -> Mailbox {
        let limiter = Arc::new(RateLimiter::with_clock(
            costs.rate,
            Arc::new(ManualClock::new()),
        ));
        Mailbox::new(remote, limiter, costs)
    }

    fn msg(id: &str, thread: &str, labels: &[&str]) -> Message {
        Message::new(id, thread, labels.iter().map(|l| LabelId::new(*l)).collect())
    }

    fn thread_with_gap(remote: &InMemoryRemote) {
        remote.add_thread(
            "t1",
            &[PROJECT],
            vec![
                msg("m1", "t1", &[PROJECT, "INBOX"]),
                msg("m2", "t1", &["INBOX"]),
                msg("m3", "t1", &[]),
            ],
        );
    }

    fn project() -> Label {
        Label::new(PROJECT, "Project")
    }

    #[test]
    fn test_missing_label() {
        let label = LabelId::new(PROJECT);
        let messages = vec![
            msg("m1", "t1", &[PROJECT]),
            msg("m2", "t1", &["INBOX"]),
            msg("m3", "t1", &[]),
        ];
        assert_eq!(
            missing_label(&messages, &label),
            vec![MessageId::new("m2"), MessageId::new("m3")]
        );
        assert!(missing_label(&[], &label).is_empty());
    }

    #[test]
    fn test_fully_labeled_thread_issues_no_write() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.add_thread(
            "t1",
            &[PROJECT],
            vec![msg("m1", "t1", &[PROJECT]), msg("m2", "t1", &[PROJECT])],
        );
        let mailbox = mailbox(remote.clone(), QuotaCosts::default());

        let outcome = Reconciler::new(&mailbox, false)
            .reconcile(&ThreadRef::new("t1"), &project())
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::None);
        assert_eq!(outcome.disposition, Disposition::Unchanged);
        assert_eq!(outcome.messages_considered, 2);
        assert_eq!(remote.write_count(), 0);
    }

    #[test]
    fn test_whole_thread_write_when_cheaper() {
        let remote = Arc::new(InMemoryRemote::new());
        thread_with_gap(&remote);
        let mailbox = mailbox(remote.clone(), QuotaCosts::default());

        let outcome = Reconciler::new(&mailbox, false)
            .reconcile(&ThreadRef::new("t1"), &project())
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::WholeThread);
        assert_eq!(outcome.disposition, Disposition::Applied);
        assert_eq!(outcome.missing, vec![MessageId::new("m2"), MessageId::new("m3")]);
        assert_eq!(
            remote.calls().last(),
            Some(&RemoteCall::AddLabelToThread(
                ThreadId::new("t1"),
                LabelId::new(PROJECT)
            ))
        );
        let label = LabelId::new(PROJECT);
        assert!(remote
            .messages(&ThreadId::new("t1"))
            .iter()
            .all(|m| m.has_label(&label)));
    }

    #[test]
    fn test_batch_write_when_cheaper() {
        let remote = Arc::new(InMemoryRemote::new());
        thread_with_gap(&remote);
        let costs = QuotaCosts {
            threads_modify: 50.0,
            messages_batch_modify: 10.0,
            ..QuotaCosts::default()
        };
        let mailbox = mailbox(remote.clone(), costs);

        let outcome = Reconciler::new(&mailbox, false)
            .reconcile(&ThreadRef::new("t1"), &project())
            .unwrap();

        assert_eq!(outcome.strategy, Strategy::MessageBatch);
        assert_eq!(
            remote.calls().last(),
            Some(&RemoteCall::AddLabelToMessages(
                vec![MessageId::new("m2"), MessageId::new("m3")],
                LabelId::new(PROJECT)
            ))
        );
        assert_eq!(remote.write_count(), 1);
    }

    #[test]
    fn test_dry_run_decides_the_same_without_writing() {
        for costs in [
            QuotaCosts::default(),
            QuotaCosts {
                threads_modify: 50.0,
                messages_batch_modify: 10.0,
                ..QuotaCosts::default()
            },
        ] {
            let live_remote = Arc::new(InMemoryRemote::new());
            thread_with_gap(&live_remote);
            let dry_remote = Arc::new(InMemoryRemote::new());
            thread_with_gap(&dry_remote);

            let live_mailbox = mailbox(live_remote.clone(), costs.clone());
            let live = Reconciler::new(&live_mailbox, false)
                .reconcile(&ThreadRef::new("t1"), &project())
                .unwrap();
            let dry_mailbox = mailbox(dry_remote.clone(), costs);
            let dry = Reconciler::new(&dry_mailbox, true)
                .reconcile(&ThreadRef::new("t1"), &project())
                .unwrap();

            assert_eq!(dry.missing, live.missing);
            assert_eq!(dry.strategy, live.strategy);
            assert_eq!(dry.disposition, Disposition::DryRun);
            assert_eq!(dry_remote.write_count(), 0);
            assert_eq!(live_remote.write_count(), 1);
        }
    }

    #[test]
    fn test_write_failure_is_returned() {
        let remote = Arc::new(InMemoryRemote::new());
        thread_with_gap(&remote);
        remote.fail_writes("t1");
        let mailbox = mailbox(remote.clone(), QuotaCosts::default());

        let err = Reconciler::new(&mailbox, false)
            .reconcile(&ThreadRef::new("t1"), &project())
            .unwrap_err();

        assert!(err.to_string().contains("Failed to add label Project to thread t1"));
    }
}
