//! Domain models for mail entities

mod label;
mod message;
mod thread;

pub use label::{Label, LabelId, LabelKind};
pub use message::{Message, MessageId};
pub use thread::{ThreadId, ThreadRef};
