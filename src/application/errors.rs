//! Application layer errors

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

/// Platform error codes meaning forwarding/copying is disabled for the chat
static FORWARD_RESTRICTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)CHAT_FORWARDS_RESTRICTED|FORWARDS_RESTRICTED|MESSAGE_COPY_FORBIDDEN")
        .expect("static pattern is valid")
});

/// Classification of a platform API failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Forwarding is disabled for the chat or message; copying may still work
    ForwardRestricted,
    Other,
}

/// Classify a platform error description
pub fn classify(description: &str) -> ApiErrorKind {
    if FORWARD_RESTRICTED.is_match(description) {
        ApiErrorKind::ForwardRestricted
    } else {
        ApiErrorKind::Other
    }
}

/// An error reported by the messaging platform, classified on construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct ApiError {
    pub code: Option<i64>,
    pub description: String,
    kind: ApiErrorKind,
}

impl ApiError {
    pub fn new(code: Option<i64>, description: impl Into<String>) -> Self {
        let description = description.into();
        let kind = classify(&description);
        Self {
            code,
            description,
            kind,
        }
    }

    pub fn is_forward_restricted(&self) -> bool {
        self.kind == ApiErrorKind::ForwardRestricted
    }
}

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

impl BotError {
    pub fn is_forward_restricted(&self) -> bool {
        matches!(self, BotError::Api(e) if e.is_forward_restricted())
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BotError::Parse(e.to_string())
        } else {
            BotError::Network(e.to_string())
        }
    }
}

/// Command registration / dispatch errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command already registered: {0}")]
    Duplicate(String),
}

/// Failures of one `re` invocation
#[derive(Error, Debug)]
pub enum RepeatError {
    /// The command was not sent as a reply
    #[error("no reply target")]
    NoReplyTarget,

    /// The anchor message could not be retrieved any more
    #[error("anchor message is no longer retrievable")]
    EmptyWindow,

    #[error("history fetch failed: {0}")]
    Fetch(#[source] BotError),

    #[error("delivery failed: {0}")]
    Delivery(#[source] BotError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_restricted_codes() {
        assert_eq!(classify("CHAT_FORWARDS_RESTRICTED"), ApiErrorKind::ForwardRestricted);
        assert_eq!(classify("400: FORWARDS_RESTRICTED"), ApiErrorKind::ForwardRestricted);
        assert_eq!(classify("Bad Request: message_copy_forbidden"), ApiErrorKind::ForwardRestricted);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify("Bad Request: message to forward not found"), ApiErrorKind::Other);
        assert_eq!(classify(""), ApiErrorKind::Other);
    }

    #[test]
    fn test_bot_error_restricted_only_for_api_errors() {
        let restricted = BotError::Api(ApiError::new(Some(400), "CHAT_FORWARDS_RESTRICTED"));
        assert!(restricted.is_forward_restricted());

        let network = BotError::Network("CHAT_FORWARDS_RESTRICTED".to_string());
        assert!(!network.is_forward_restricted());
    }
}
