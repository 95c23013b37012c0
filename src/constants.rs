// Defaults, loaded from the environment (or .env) when set.

use std::env;

/// Shown for every transport or parse failure. Never includes the failure detail.
pub const ERROR_TEXT: &str = "Sorry, I couldn't process your request.";

/// Shown while a request is outstanding.
pub const PENDING_TEXT: &str = "Thinking...";

pub const PAGE_TITLE: &str = "Sustainability Analytics";
pub const INPUT_PLACEHOLDER: &str = "Message ChatGreeny";

/// History previews keep this many characters of the query.
pub const HISTORY_PREVIEW_CHARS: usize = 30;

pub const DEFAULT_PORT: u16 = 9900;

lazy_static::lazy_static! {
    pub static ref ANSWER_URL: String = env::var("GREENY_ANSWER_URL").unwrap_or_else(|_| "http://localhost:8000/generate-answer".to_string());
    pub static ref REQUEST_TIMEOUT_SECS: u64 = env::var("GREENY_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60);
    pub static ref TEMPLATES_DIR: String = env::var("GREENY_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("GREENY_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}
