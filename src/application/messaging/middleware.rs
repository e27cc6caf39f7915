//! Middleware system - gates every incoming message passes before dispatch

use std::collections::HashSet;
use std::sync::Arc;
use crate::domain::entities::{ChatId, ChatMessage};

/// Middleware trait - inspects a message and may stop it from being handled
pub trait Middleware: Send + Sync {
    fn process(&self, message: &ChatMessage) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<(), MiddlewareError>;

/// Middleware errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareError {
    /// Stop processing silently
    Blocked(String),
}

impl std::fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareError::Blocked(msg) => write!(f, "Blocked: {}", msg),
        }
    }
}

impl std::error::Error for MiddlewareError {}

/// Ordered middleware chain; the first rejection wins
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn run(&self, message: &ChatMessage) -> MiddlewareResult {
        self.middlewares.iter().try_for_each(|m| m.process(message))
    }
}

/// Only lets through messages from configured chats; an empty list allows all
pub struct AllowedChats {
    chats: HashSet<ChatId>,
}

impl AllowedChats {
    pub fn new(chats: impl IntoIterator<Item = i64>) -> Self {
        Self {
            chats: chats.into_iter().map(ChatId).collect(),
        }
    }

    pub fn allows(&self, chat_id: ChatId) -> bool {
        self.chats.is_empty() || self.chats.contains(&chat_id)
    }
}

impl Middleware for AllowedChats {
    fn process(&self, message: &ChatMessage) -> MiddlewareResult {
        if self.allows(message.chat_id) {
            Ok(())
        } else {
            Err(MiddlewareError::Blocked(format!("chat {} not allowed", message.chat_id)))
        }
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, message: &ChatMessage) -> MiddlewareResult {
        let preview = message.text()
            .map(|s| s.chars().take(50).collect::<String>())
            .unwrap_or_else(|| "[media]".to_string());

        tracing::debug!("[{}] #{} {}", message.chat_id, message.id, preview);
        Ok(())
    }
}
