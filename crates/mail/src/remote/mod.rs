//! Remote mailbox abstraction
//!
//! The core never talks HTTP directly. It goes through [`MailRemote`],
//! wrapped in a [`Mailbox`] that charges every call against the shared
//! rate limiter and records what is being attempted in a [`Status`].

mod mailbox;
mod memory;
mod status;
mod traits;

pub use mailbox::Mailbox;
pub use memory::{InMemoryRemote, RemoteCall};
pub use status::Status;
pub use traits::{MailRemote, ThreadPage};
