//! Lazy pagination over a label's threads

use anyhow::Result;
use std::collections::VecDeque;

use crate::models::{Label, ThreadRef};
use crate::remote::Mailbox;

/// Iterator over every thread of a label matching a query.
///
/// Pages are fetched on demand through the [`Mailbox`], so each fetch is
/// charged against the rate limiter. The iterator is single-pass; listing
/// again means building a new one. A failed fetch is yielded once and ends
/// the iteration.
pub struct ThreadPages<'a> {
    mailbox: &'a Mailbox,
    label: &'a Label,
    query: Option<&'a str>,
    buffer: VecDeque<ThreadRef>,
    next_page_token: Option<String>,
    pages_fetched: usize,
    done: bool,
}

impl<'a> ThreadPages<'a> {
    pub fn new(mailbox: &'a Mailbox, label: &'a Label, query: Option<&'a str>) -> Self {
        Self {
            mailbox,
            label,
            query,
            buffer: VecDeque::new(),
            next_page_token: None,
            pages_fetched: 0,
            done: false,
        }
    }

    /// Number of pages fetched so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self) -> Result<()> {
        let page = self.mailbox.list_threads(
            self.label,
            self.query,
            self.next_page_token.as_deref(),
        )?;
        self.pages_fetched += 1;
        self.next_page_token = page.next_page_token;
        if self.next_page_token.is_none() {
            self.done = true;
        }
        self.buffer.extend(page.threads);
        Ok(())
    }
}

impl Iterator for ThreadPages<'_> {
    type Item = Result<ThreadRef>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(thread) = self.buffer.pop_front() {
                return Some(Ok(thread));
            }
            if self.done {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.done = true;
                return Some(Err(e.context(format!(
                    "Failed to list threads for label {}",
                    self.label.name
                ))));
            }
        }
    }
}

impl std::iter::FusedIterator for ThreadPages<'_> {}
