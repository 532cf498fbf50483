//! Write strategy decision

use serde::{Deserialize, Serialize};

/// How a thread's missing label gets applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Every message already carries the label
    None,
    /// One threads.modify call on the whole thread
    WholeThread,
    /// One messages.batchModify call on the messages missing the label
    MessageBatch,
}

/// Pick the cheaper write for a thread.
///
/// Both writes are a single call whatever the number of messages, so the
/// choice only compares their declared costs. Ties go to the message batch,
/// which touches nothing beyond the messages that need it.
pub fn choose_strategy(whole_thread_cost: f64, batch_cost: f64, has_missing: bool) -> Strategy {
    if !has_missing {
        Strategy::None
    } else if whole_thread_cost < batch_cost {
        Strategy::WholeThread
    } else {
        Strategy::MessageBatch
    }
}
