//! Relabel run orchestration
//!
//! Relabeling works as follows:
//! 1. list all labels and keep the user labels (optionally narrowed by name)
//! 2. for each such label, stream the threads carrying it
//! 3. for each thread, find the messages not carrying the label
//! 4. label them, through whichever write costs less quota

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{debug, info, warn};

use super::pages::ThreadPages;
use super::reconcile::{Disposition, Reconciler, ThreadOutcome};
use crate::gmail::AuthError;
use crate::models::{Label, ThreadId};
use crate::query::date_query;
use crate::ratelimit::CostExceedsCapacity;
use crate::remote::Mailbox;

/// Which labels and threads a run covers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Label names to consider; empty means every user label
    pub labels: Vec<String>,
    /// Inclusive lower bound on thread dates
    pub since: Option<NaiveDate>,
    /// Exclusive upper bound on thread dates
    pub until: Option<NaiveDate>,
    /// Decide and report, but do not write
    pub dry_run: bool,
}

impl Selection {
    /// Flatten repeated, comma-joined label arguments into names
    pub fn parse_label_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
        args.iter()
            .flat_map(|arg| arg.as_ref().split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A thread that could not be reconciled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadFailure {
    pub label: String,
    pub thread_id: ThreadId,
    pub error: String,
}

/// Statistics from a relabel run
#[derive(Debug, Default, Clone)]
pub struct RelabelStats {
    /// Number of labels walked
    pub labels_selected: usize,
    /// Number of threads listed and inspected
    pub threads_processed: usize,
    /// Number of threads already consistent
    pub threads_unchanged: usize,
    /// Number of write calls issued
    pub writes_issued: usize,
    /// Number of write calls decided but suppressed by dry-run
    pub writes_planned: usize,
    /// Total messages found lacking their thread's label
    pub messages_missing: usize,
    /// Threads that failed, in encounter order
    pub failures: Vec<ThreadFailure>,
    /// Outcome of every successfully reconciled thread
    pub outcomes: Vec<ThreadOutcome>,
    /// Duration of the run
    pub duration_ms: u64,
}

impl RelabelStats {
    /// Threads that needed no write
    pub fn skipped(&self) -> usize {
        self.threads_processed
            .saturating_sub(self.writes_issued + self.writes_planned + self.failures.len())
    }

    fn record(&mut self, outcome: ThreadOutcome) {
        self.messages_missing += outcome.missing.len();
        match outcome.disposition {
            Disposition::Unchanged => self.threads_unchanged += 1,
            Disposition::Applied => self.writes_issued += 1,
            Disposition::DryRun => self.writes_planned += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Whether an error must end the run instead of being recorded per thread
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.is::<CostExceedsCapacity>() || cause.is::<AuthError>())
}

/// Keep the user labels, narrowed to `names` when any are given.
///
/// Order is preserved as returned by the remote. Requested names matching
/// no user label are reported and ignored.
pub fn select_labels(labels: Vec<Label>, names: &[String]) -> Vec<Label> {
    let user: Vec<Label> = labels.into_iter().filter(Label::is_user).collect();
    if names.is_empty() {
        return user;
    }

    for name in names {
        if !user.iter().any(|l| &l.name == name) {
            warn!("Label {:?} not found among user labels", name);
        }
    }
    user.into_iter().filter(|l| names.contains(&l.name)).collect()
}

/// Drives a relabel run over a mailbox
pub struct Relabeler<'a> {
    mailbox: &'a Mailbox,
}

impl<'a> Relabeler<'a> {
    pub fn new(mailbox: &'a Mailbox) -> Self {
        Self { mailbox }
    }

    /// Relabel every thread covered by the selection.
    ///
    /// Failures confined to one thread are recorded in the stats and the
    /// run moves on. Listing failures, oversized quota costs and
    /// authentication failures end the run.
    pub fn run(&self, selection: &Selection) -> Result<RelabelStats> {
        let start = std::time::Instant::now();
        let mut stats = RelabelStats::default();

        let labels = self
            .mailbox
            .list_labels()
            .context("Failed to list labels")?;
        for label in labels.iter().filter(|l| l.id.is_unrecognized()) {
            warn!(
                "Unrecognized label <{}, {}>, treating as user label",
                label.name, label.id
            );
        }

        let labels = select_labels(labels, &selection.labels);
        stats.labels_selected = labels.len();
        info!("Labels: selected {} user labels", labels.len());
        for label in &labels {
            debug!("  {:32} ({})", label.name, label.id);
        }

        let query = date_query(selection.since, selection.until);
        if let Some(query) = &query {
            debug!("Query: {}", query);
        }

        let reconciler = Reconciler::new(self.mailbox, selection.dry_run);
        for label in &labels {
            let mut pages = ThreadPages::new(self.mailbox, label, query.as_deref());
            let mut threads = 0;

            for thread in pages.by_ref() {
                let thread = thread?;
                threads += 1;
                stats.threads_processed += 1;

                match reconciler.reconcile(&thread, label) {
                    Ok(outcome) => stats.record(outcome),
                    Err(e) if is_fatal(&e) => return Err(e),
                    Err(e) => {
                        warn!("Thread {}: {:#}", thread.id.as_str(), e);
                        stats.failures.push(ThreadFailure {
                            label: label.name.clone(),
                            thread_id: thread.id.clone(),
                            error: format!("{:#}", e),
                        });
                    }
                }
            }

            info!(
                "Label: {}, total threads {} ({} pages)",
                label.name,
                threads,
                pages.pages_fetched()
            );
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Done: {} threads processed, {} write calls {} ({} skipped, {} failed) in {}ms",
            stats.threads_processed,
            if selection.dry_run {
                stats.writes_planned
            } else {
                stats.writes_issued
            },
            if selection.dry_run { "planned" } else { "issued" },
            stats.skipped(),
            stats.failures.len(),
            stats.duration_ms
        );
        Ok(stats)
    }
}
