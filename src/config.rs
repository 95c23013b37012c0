use std::path::PathBuf;
use std::time::Duration;

use crate::answer_service::{HttpAnswerService, TransportError};
use crate::constants;

/// Resolved runtime settings. Defaults come from the environment (see
/// `constants`); command-line flags override individual fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub answer_url: String,
    pub request_timeout: Duration,
    pub port: u16,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            answer_url: constants::ANSWER_URL.clone(),
            request_timeout: Duration::from_secs(*constants::REQUEST_TIMEOUT_SECS),
            port: constants::DEFAULT_PORT,
            templates_dir: PathBuf::from(constants::TEMPLATES_DIR.as_str()),
            static_dir: PathBuf::from(constants::STATIC_DIR.as_str()),
        }
    }
}

impl Settings {
    pub fn answer_service(&self) -> Result<HttpAnswerService, TransportError> {
        HttpAnswerService::new(self.answer_url.clone(), self.request_timeout)
    }
}
