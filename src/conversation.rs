//! The conversation store: the ordered message list plus the single-flight
//! request status.
//!
//! Status transitions are `Idle --begin_request--> Pending --complete_request--> Idle`.
//! Nothing else moves it, and there is no cancelled state.

use serde::Serialize;
use thiserror::Error;

use crate::constants::HISTORY_PREVIEW_CHARS;
use crate::message::{Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("message text is empty")]
    EmptyInput,
    #[error("a request is already pending")]
    AlreadyPending,
    #[error("no request is pending")]
    NotPending,
}

#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    status: RequestStatus,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message and returns its index. Blank text is rejected
    /// without touching the conversation.
    pub fn append_user_message(&mut self, text: &str) -> Result<usize, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyInput);
        }
        self.messages.push(Message::user(text));
        Ok(self.messages.len() - 1)
    }

    pub fn begin_request(&mut self) -> Result<(), StoreError> {
        if self.status == RequestStatus::Pending {
            return Err(StoreError::AlreadyPending);
        }
        self.status = RequestStatus::Pending;
        Ok(())
    }

    /// Appends the answer (or error notice) for the outstanding request and
    /// returns to idle. Calling this while idle is a caller bug.
    pub fn complete_request(&mut self, message: Message) -> Result<usize, StoreError> {
        if self.status != RequestStatus::Pending {
            return Err(StoreError::NotPending);
        }
        self.messages.push(message);
        self.status = RequestStatus::Idle;
        Ok(self.messages.len() - 1)
    }

    #[cfg(test)]
    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.messages.clone(),
            status: self.status,
        }
    }
}

/// Read-only copy of the store handed to rendering surfaces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub status: RequestStatus,
}

impl Snapshot {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Short previews of the user's queries, oldest first, for the history list.
    pub fn history(&self) -> Vec<String> {
        self.messages
            .iter()
            .filter(|m| m.role() == Role::User)
            .map(|m| preview(m.text()))
            .collect()
    }
}

fn preview(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= HISTORY_PREVIEW_CHARS {
        return text.to_string();
    }
    let mut short: String = text.chars().take(HISTORY_PREVIEW_CHARS).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_user_message() {
        let mut store = ConversationStore::new();
        let idx = store.append_user_message("Which company emits the most?").unwrap();

        assert_eq!(idx, 0);
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].role(), Role::User);
        assert_eq!(store.messages()[0].text(), "Which company emits the most?");
        assert_eq!(store.status(), RequestStatus::Idle);
    }

    #[test]
    fn test_append_user_message_keeps_text_untrimmed() {
        let mut store = ConversationStore::new();
        store.append_user_message("  padded  ").unwrap();
        assert_eq!(store.messages()[0].text(), "  padded  ");
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut store = ConversationStore::new();
        assert_eq!(store.append_user_message(""), Err(StoreError::EmptyInput));
        assert_eq!(store.append_user_message("   "), Err(StoreError::EmptyInput));
        assert_eq!(store.append_user_message("\n\t"), Err(StoreError::EmptyInput));
        assert!(store.messages().is_empty());
        assert_eq!(store.status(), RequestStatus::Idle);
    }

    #[test]
    fn test_begin_request_twice_fails() {
        let mut store = ConversationStore::new();
        store.begin_request().unwrap();
        assert_eq!(store.begin_request(), Err(StoreError::AlreadyPending));
        assert_eq!(store.status(), RequestStatus::Pending);
    }

    #[test]
    fn test_complete_without_begin_fails() {
        let mut store = ConversationStore::new();
        assert_eq!(
            store.complete_request(Message::assistant("orphan", None)),
            Err(StoreError::NotPending)
        );
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_complete_returns_to_idle() {
        let mut store = ConversationStore::new();
        store.append_user_message("first").unwrap();
        store.begin_request().unwrap();
        let idx = store.complete_request(Message::error_notice()).unwrap();

        assert_eq!(idx, 1);
        assert_eq!(store.status(), RequestStatus::Idle);
        assert!(store.begin_request().is_ok());
    }

    #[test]
    fn test_insertion_order_is_display_order() {
        let mut store = ConversationStore::new();
        store.append_user_message("q1").unwrap();
        store.begin_request().unwrap();
        store.complete_request(Message::assistant("a1", None)).unwrap();
        store.append_user_message("q2").unwrap();
        store.begin_request().unwrap();
        store.complete_request(Message::error_notice()).unwrap();

        let roles: Vec<Role> = store.messages().iter().map(|m| m.role()).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Error]
        );
    }

    #[test]
    fn test_snapshot_reflects_status() {
        let mut store = ConversationStore::new();
        store.append_user_message("q").unwrap();
        store.begin_request().unwrap();

        let snapshot = store.snapshot();
        assert!(snapshot.is_pending());
        assert_eq!(snapshot.messages.len(), 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[test]
    fn test_history_previews_user_queries() {
        let mut store = ConversationStore::new();
        store
            .append_user_message("What were the total emissions of every company in 2021?")
            .unwrap();
        store.begin_request().unwrap();
        store.complete_request(Message::assistant("Lots.", None)).unwrap();
        store.append_user_message("Top emitter?").unwrap();

        let history = store.snapshot().history();
        assert_eq!(
            history,
            vec![
                "What were the total emissions ...".to_string(),
                "Top emitter?".to_string(),
            ]
        );
    }

    #[test]
    fn test_history_preview_counts_chars() {
        let long = "é".repeat(40);
        let mut store = ConversationStore::new();
        store.append_user_message(&long).unwrap();

        let history = store.snapshot().history();
        assert_eq!(history[0], format!("{}...", "é".repeat(30)));
    }
}
