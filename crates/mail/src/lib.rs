//! Mail crate - quota-aware label sync for Gmail
//!
//! This crate provides:
//! - Domain models (Label, Thread, Message)
//! - A token-bucket rate limiter and the Gmail quota cost schedule
//! - The remote mailbox abstraction, with Gmail and in-memory backends
//! - Date-range query construction
//! - The relabel engine: pagination, per-thread reconciliation and run driver
//!
//! The engine never depends on HTTP directly; everything goes through
//! [`MailRemote`], so it runs unchanged against [`InMemoryRemote`].

pub mod config;
pub mod gmail;
pub mod models;
pub mod query;
pub mod ratelimit;
pub mod remote;
pub mod sync;

pub use crate::config::GmailCredentials;
pub use gmail::{AuthError, GmailAuth, GmailClient};
pub use models::{Label, LabelId, LabelKind, Message, MessageId, ThreadId, ThreadRef};
pub use query::{DateArgError, date_query, parse_date_arg};
pub use ratelimit::{Clock, CostExceedsCapacity, ManualClock, QuotaCosts, RateLimiter, SystemClock};
pub use remote::{InMemoryRemote, MailRemote, Mailbox, RemoteCall, Status, ThreadPage};
pub use sync::{
    Disposition, RelabelStats, Relabeler, Reconciler, Selection, Strategy, ThreadFailure,
    ThreadOutcome, ThreadPages, choose_strategy, is_fatal, missing_label, select_labels,
};
