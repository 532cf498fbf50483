//! Normalize Gmail API responses to domain models

use super::api::{GmailLabel, ListThreadsResponse, MinimalMessage};
use crate::models::{Label, LabelId, Message, ThreadRef};
use crate::remote::ThreadPage;

/// Convert a Gmail label; classification follows the id, not the `type` field
pub fn normalize_label(label: GmailLabel) -> Label {
    Label::new(label.id, label.name)
}

/// Convert a minimal-format message
pub fn normalize_message(message: MinimalMessage) -> Message {
    Message::new(
        message.id,
        message.thread_id,
        message
            .label_ids
            .unwrap_or_default()
            .into_iter()
            .map(LabelId::from)
            .collect(),
    )
}

/// Convert a threads.list response into a page
pub fn normalize_thread_page(response: ListThreadsResponse) -> ThreadPage {
    ThreadPage {
        threads: response
            .threads
            .unwrap_or_default()
            .into_iter()
            .map(|t| ThreadRef::new(t.id))
            .collect(),
        // Gmail may send an empty token on the last page
        next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::{ListLabelsResponse, MinimalThread};
    use crate::models::LabelKind;

    #[test]
    fn test_normalize_labels() {
        let json = r#"{
            "labels": [
                { "id": "INBOX", "name": "INBOX", "type": "system" },
                { "id": "Label_12", "name": "Project", "type": "user",
                  "messageListVisibility": "show" }
            ]
        }"#;
        let response: ListLabelsResponse = serde_json::from_str(json).unwrap();
        let labels: Vec<Label> = response
            .labels
            .unwrap()
            .into_iter()
            .map(normalize_label)
            .collect();

        assert_eq!(labels[0].kind, LabelKind::System);
        assert_eq!(labels[1].kind, LabelKind::User);
        assert_eq!(labels[1].name, "Project");
    }

    #[test]
    fn test_normalize_thread_page() {
        let json = r#"{
            "threads": [
                { "id": "17a1", "snippet": "hello", "historyId": "42" },
                { "id": "17a2", "snippet": "", "historyId": "43" }
            ],
            "nextPageToken": "abc",
            "resultSizeEstimate": 2
        }"#;
        let response: ListThreadsResponse = serde_json::from_str(json).unwrap();
        let page = normalize_thread_page(response);

        assert_eq!(page.threads, vec![ThreadRef::new("17a1"), ThreadRef::new("17a2")]);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_normalize_last_page() {
        let response: ListThreadsResponse =
            serde_json::from_str(r#"{ "resultSizeEstimate": 0 }"#).unwrap();
        let page = normalize_thread_page(response);
        assert!(page.threads.is_empty());
        assert_eq!(page.next_page_token, None);
    }

    #[test]
    fn test_normalize_minimal_thread() {
        let json = r#"{
            "id": "t1",
            "historyId": "99",
            "messages": [
                { "id": "m1", "threadId": "t1", "labelIds": ["INBOX", "Label_12"],
                  "snippet": "", "sizeEstimate": 100 },
                { "id": "m2", "threadId": "t1" }
            ]
        }"#;
        let thread: MinimalThread = serde_json::from_str(json).unwrap();
        let messages: Vec<Message> = thread
            .messages
            .unwrap()
            .into_iter()
            .map(normalize_message)
            .collect();

        assert!(messages[0].has_label(&LabelId::new("Label_12")));
        assert!(messages[1].label_ids.is_empty());
    }
}
