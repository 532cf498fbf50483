//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 authentication flow
//! - Gmail API client implementing [`MailRemote`](crate::remote::MailRemote)
//! - Response normalization to domain models

mod auth;
mod client;
mod normalize;

pub use auth::{AuthError, GmailAuth};
pub use client::GmailClient;
pub use normalize::{normalize_label, normalize_message, normalize_thread_page};

/// Gmail API request and response types
pub mod api {
    use serde::{Deserialize, Serialize};

    /// Response from listing labels
    #[derive(Debug, Deserialize)]
    pub struct ListLabelsResponse {
        pub labels: Option<Vec<GmailLabel>>,
    }

    /// Label as returned by the labels endpoint
    #[derive(Debug, Deserialize)]
    pub struct GmailLabel {
        pub id: String,
        pub name: String,
        /// "system" or "user"
        #[serde(rename = "type")]
        pub label_type: Option<String>,
    }

    /// Response from listing threads
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListThreadsResponse {
        pub threads: Option<Vec<ThreadStub>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Thread entry in a listing
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ThreadStub {
        pub id: String,
        pub history_id: Option<String>,
    }

    /// Thread fetched with `format=minimal`
    #[derive(Debug, Deserialize)]
    pub struct MinimalThread {
        pub id: String,
        pub messages: Option<Vec<MinimalMessage>>,
    }

    /// Message in minimal format: identity and labels only
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MinimalMessage {
        pub id: String,
        pub thread_id: String,
        pub label_ids: Option<Vec<String>>,
    }

    /// Body of threads.modify
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ModifyThreadRequest<'a> {
        pub add_label_ids: Vec<&'a str>,
    }

    /// Body of messages.batchModify
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BatchModifyRequest<'a> {
        pub ids: Vec<&'a str>,
        pub add_label_ids: Vec<&'a str>,
    }
}
