//! The submit pipeline: append the query, mark the request pending, await the
//! answer service, interpret the reply and complete the request.
//!
//! The conversation lock is only held for the synchronous store mutations,
//! never across the remote call, so a surface can keep rendering snapshots
//! (and rejecting overlapping submissions) while a request is outstanding.

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::answer_service::AnswerService;
use crate::conversation::{ConversationStore, Snapshot, StoreError};
use crate::interpreter;
use crate::message::Message;

/// Proof that a submission was accepted. Consumed by [`ChatSession::resolve`].
#[derive(Debug)]
#[must_use = "an accepted submission must be resolved to leave the pending state"]
pub struct PendingQuery {
    query: String,
}

impl PendingQuery {
    pub fn query(&self) -> &str {
        &self.query
    }
}

pub struct ChatSession<S> {
    store: Mutex<ConversationStore>,
    service: S,
}

impl<S: AnswerService> ChatSession<S> {
    pub fn new(service: S) -> Self {
        Self {
            store: Mutex::new(ConversationStore::new()),
            service,
        }
    }

    // Every store operation leaves it consistent, so a poisoned lock is still usable.
    fn store(&self) -> MutexGuard<'_, ConversationStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Accepts a query: appends the user message and begins the request.
    /// A rejected submission leaves the conversation untouched.
    pub fn submit(&self, text: &str) -> Result<PendingQuery, StoreError> {
        let mut store = self.store();
        if text.trim().is_empty() {
            debug!("Ignoring blank submission");
            return Err(StoreError::EmptyInput);
        }
        if store.is_pending() {
            warn!("Rejected submission while a request is pending");
            return Err(StoreError::AlreadyPending);
        }
        let index = store.append_user_message(text)?;
        store.begin_request()?;
        info!(index, "Submitted query");
        Ok(PendingQuery {
            query: text.to_string(),
        })
    }

    /// Runs the accepted query to completion. Transport and parse failures
    /// become the error notice; the detail goes to the log only.
    pub async fn resolve(&self, pending: PendingQuery) -> Result<Message, StoreError> {
        let message = match self.service.fetch(&pending.query).await {
            Ok(body) => interpreter::try_interpret(&body).unwrap_or_else(|err| {
                warn!(error = %err, "Could not interpret answer service response");
                Message::error_notice()
            }),
            Err(err) => {
                warn!(error = %err, "Answer service request failed");
                Message::error_notice()
            }
        };

        self.store().complete_request(message.clone())?;
        info!(role = ?message.role(), charted = message.visualization().is_some(), "Completed query");
        Ok(message)
    }

    pub async fn ask(&self, text: &str) -> Result<Message, StoreError> {
        let pending = self.submit(text)?;
        self.resolve(pending).await
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store().snapshot()
    }
}
