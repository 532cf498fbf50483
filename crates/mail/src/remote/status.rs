//! Last execution context, kept for diagnostics

use std::sync::{PoisonError, RwLock};

/// Description of what is currently being attempted.
///
/// Overwritten before every remote call; read back only to report where
/// a fatal error happened.
#[derive(Debug)]
pub struct Status {
    current: RwLock<String>,
}

impl Status {
    pub fn new() -> Self {
        Self {
            current: RwLock::new("n/a".to_string()),
        }
    }

    pub fn set(&self, status: impl Into<String>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = status.into();
    }

    pub fn get(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_overwrites() {
        let status = Status::new();
        assert_eq!(status.get(), "n/a");

        status.set("Label: retrieving list of labels");
        status.set("Thread t1: retrieving list of messages");

        assert_eq!(status.get(), "Thread t1: retrieving list of messages");
    }
}
