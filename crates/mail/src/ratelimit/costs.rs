//! Quota cost schedule for Gmail API operations

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Quota policy file in the config directory
const QUOTA_FILE: &str = "quota.json";

/// Declared quota cost of each remote operation, plus the bucket rate.
///
/// Defaults follow the Gmail per-user quota schedule
/// (https://developers.google.com/gmail/api/reference/quota, Nov 2020).
/// Costs are flat per call regardless of payload size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaCosts {
    /// labels.list
    pub labels_list: f64,
    /// threads.list, charged per page
    pub threads_list: f64,
    /// threads.get
    pub threads_get: f64,
    /// threads.modify
    pub threads_modify: f64,
    /// messages.batchModify
    pub messages_batch_modify: f64,
    /// Units per second, also the bucket capacity
    pub rate: f64,
}

impl Default for QuotaCosts {
    fn default() -> Self {
        Self {
            labels_list: 1.0,
            threads_list: 10.0,
            threads_get: 10.0,
            threads_modify: 10.0,
            messages_batch_modify: 50.0,
            rate: 250.0,
        }
    }
}

impl QuotaCosts {
    /// Load the quota policy.
    ///
    /// An explicit path must exist. Without one, `quota.json` in the config
    /// directory is used when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let costs: Self = match path {
            Some(path) => config::load_json_file(path)?,
            None if config::config_exists(QUOTA_FILE) => config::load_json(QUOTA_FILE)?,
            None => Self::default(),
        };
        costs.validate()?;
        Ok(costs)
    }

    /// Reject non-positive costs and rates
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("labels_list", self.labels_list),
            ("threads_list", self.threads_list),
            ("threads_get", self.threads_get),
            ("threads_modify", self.threads_modify),
            ("messages_batch_modify", self.messages_batch_modify),
            ("rate", self.rate),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                anyhow::bail!("Invalid quota policy: {} must be positive (got {})", name, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_gmail_schedule() {
        let costs = QuotaCosts::default();
        assert_eq!(costs.threads_modify, 10.0);
        assert_eq!(costs.messages_batch_modify, 50.0);
        assert_eq!(costs.rate, 250.0);
        assert!(costs.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.json");
        std::fs::write(&path, r#"{ "messages_batch_modify": 5, "rate": 100 }"#).unwrap();

        let costs = QuotaCosts::load(Some(&path)).unwrap();
        assert_eq!(costs.messages_batch_modify, 5.0);
        assert_eq!(costs.rate, 100.0);
        assert_eq!(costs.threads_modify, 10.0);
    }

    #[test]
    fn test_load_rejects_zero_cost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quota.json");
        std::fs::write(&path, r#"{ "threads_get": 0 }"#).unwrap();

        let err = QuotaCosts::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("threads_get"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(QuotaCosts::load(Some(&dir.path().join("nope.json"))).is_err());
    }
}
