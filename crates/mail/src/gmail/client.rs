//! Gmail API HTTP client
//!
//! Implements the remote mailbox operations against the Gmail REST API.
//! Uses synchronous HTTP (ureq) to be executor-agnostic. Each method is
//! exactly one HTTP call; quota and retries are handled by the caller.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::api::{
    BatchModifyRequest, ListLabelsResponse, ListThreadsResponse, MinimalThread,
    ModifyThreadRequest,
};
use super::{AuthError, GmailAuth, normalize_label, normalize_message, normalize_thread_page};
use crate::models::{Label, LabelId, Message, MessageId, ThreadId};
use crate::remote::{MailRemote, ThreadPage};

/// Gmail API client
pub struct GmailClient {
    auth: GmailAuth,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1/users/me";

    /// Threads per listing page (API maximum)
    const PAGE_SIZE: &'static str = "500";

    /// Create a new Gmail client
    pub fn new(auth: GmailAuth) -> Self {
        Self { auth }
    }

    /// Trigger authentication flow
    pub fn authenticate(&self) -> Result<()> {
        self.access_token()?;
        Ok(())
    }

    fn access_token(&self) -> Result<String> {
        self.auth
            .get_access_token()
            .map_err(|e| AuthError(format!("{:#}", e)).into())
    }

    fn endpoint(path: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", Self::BASE_URL, path))
            .with_context(|| format!("Invalid Gmail API path: {}", path))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url, what: &str) -> Result<T> {
        let access_token = self.access_token()?;

        let mut response = ureq::get(url.as_str())
            .header("Authorization", &format!("Bearer {}", access_token))
            .call()
            .with_context(|| format!("Failed to send {} request", what))?;

        response
            .body_mut()
            .read_json()
            .with_context(|| format!("Failed to parse {} response", what))
    }

    fn post_json<B: Serialize>(&self, url: &Url, body: &B, what: &str) -> Result<()> {
        let access_token = self.access_token()?;

        ureq::post(url.as_str())
            .header("Authorization", &format!("Bearer {}", access_token))
            .send_json(body)
            .with_context(|| format!("Failed to send {} request", what))?;

        Ok(())
    }
}

impl MailRemote for GmailClient {
    fn list_labels(&self) -> Result<Vec<Label>> {
        let url = Self::endpoint("labels")?;
        let response: ListLabelsResponse = self.get_json(&url, "list labels")?;

        Ok(response
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(normalize_label)
            .collect())
    }

    fn list_threads(
        &self,
        label_id: &LabelId,
        query: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        let mut url = Self::endpoint("threads")?;
        {
            let mut params = url.query_pairs_mut();
            params.append_pair("labelIds", label_id.as_str());
            params.append_pair("maxResults", Self::PAGE_SIZE);
            if let Some(query) = query {
                params.append_pair("q", query);
            }
            if let Some(token) = page_token {
                params.append_pair("pageToken", token);
            }
        }

        let response: ListThreadsResponse = self.get_json(&url, "list threads")?;
        Ok(normalize_thread_page(response))
    }

    fn thread_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>> {
        let mut url = Self::endpoint(&format!(
            "threads/{}",
            urlencoding::encode(thread_id.as_str())
        ))?;
        url.query_pairs_mut().append_pair("format", "minimal");

        let thread: MinimalThread = self.get_json(&url, "get thread")?;
        Ok(thread
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(normalize_message)
            .collect())
    }

    fn add_label_to_thread(&self, thread_id: &ThreadId, label_id: &LabelId) -> Result<()> {
        let url = Self::endpoint(&format!(
            "threads/{}/modify",
            urlencoding::encode(thread_id.as_str())
        ))?;
        let body = ModifyThreadRequest {
            add_label_ids: vec![label_id.as_str()],
        };
        self.post_json(&url, &body, "modify thread")
    }

    fn add_label_to_messages(&self, message_ids: &[MessageId], label_id: &LabelId) -> Result<()> {
        let url = Self::endpoint("messages/batchModify")?;
        let body = BatchModifyRequest {
            ids: message_ids.iter().map(|id| id.as_str()).collect(),
            add_label_ids: vec![label_id.as_str()],
        };
        self.post_json(&url, &body, "batch modify messages")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let url = GmailClient::endpoint("messages/batchModify").unwrap();
        assert_eq!(
            url.as_str(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages/batchModify"
        );
    }

    #[test]
    fn test_query_is_encoded() {
        let mut url = GmailClient::endpoint("threads").unwrap();
        url.query_pairs_mut()
            .append_pair("labelIds", "Label_1")
            .append_pair("q", "after:2024-01-01 before:2024-02-01");
        assert_eq!(
            url.query(),
            Some("labelIds=Label_1&q=after%3A2024-01-01+before%3A2024-02-01")
        );
    }

    #[test]
    fn test_batch_modify_body() {
        let ids = [MessageId::new("m1"), MessageId::new("m2")];
        let body = BatchModifyRequest {
            ids: ids.iter().map(|id| id.as_str()).collect(),
            add_label_ids: vec!["Label_1"],
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"ids":["m1","m2"],"addLabelIds":["Label_1"]}"#
        );
    }
}
