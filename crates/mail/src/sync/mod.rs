//! Label sync engine
//!
//! Walks labels → threads → messages and brings every message of a
//! labeled thread up to that label, spending as little quota as possible.
//!
//! - [`ThreadPages`] streams a label's threads page by page
//! - [`Reconciler`] decides and applies the write for one thread
//! - [`Relabeler`] drives a whole run for a [`Selection`]

mod pages;
mod reconcile;
mod relabel;
mod strategy;

pub use pages::ThreadPages;
pub use reconcile::{Disposition, Reconciler, ThreadOutcome, missing_label};
pub use relabel::{RelabelStats, Relabeler, Selection, ThreadFailure, is_fatal, select_labels};
pub use strategy::{Strategy, choose_strategy};
