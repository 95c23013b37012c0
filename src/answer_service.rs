use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to answer service failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("answer service returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Remote collaborator that answers a query. Implementations return the raw
/// response body; turning it into a message is the interpreter's job.
pub trait AnswerService {
    fn fetch(&self, query: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Serialize)]
struct AnswerRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpAnswerService {
    client: Client,
    url: String,
}

impl HttpAnswerService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AnswerService for HttpAnswerService {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self, query: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(&AnswerRequest { query })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Answer service request failed");
            return Err(TransportError::Status { status, body });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Received answer service response");
        Ok(body)
    }
}
