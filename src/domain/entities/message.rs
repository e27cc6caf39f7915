use chrono::{DateTime, Utc};
use std::fmt;

/// Identity of a chat on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

/// Identity of a message, unique within its chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub i64);

/// Forum topic / thread inside a chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message content needed to re-emit a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Media { kind: String, caption: Option<String> },
    Empty,
}

impl Payload {
    pub fn text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            Payload::Media { caption, .. } => caption.as_deref(),
            Payload::Empty => None,
        }
    }
}

/// Point in a chat's history a window starts at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub id: MessageId,
    pub date: DateTime<Utc>,
}

/// Reference from a message to the one it replies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyRef {
    pub id: MessageId,
    pub date: DateTime<Utc>,
}

impl From<ReplyRef> for Anchor {
    fn from(reply: ReplyRef) -> Self {
        Anchor { id: reply.id, date: reply.date }
    }
}

/// A message belonging to a chat, as seen by the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub date: DateTime<Utc>,
    pub thread_id: Option<ThreadId>,
    /// Platform forbids forwarding/copying this message by ordinary means
    pub content_protected: bool,
    pub reply_to: Option<ReplyRef>,
    pub payload: Payload,
}

impl ChatMessage {
    pub fn new(chat_id: ChatId, id: MessageId, payload: Payload) -> Self {
        Self {
            id,
            chat_id,
            date: Utc::now(),
            thread_id: None,
            content_protected: false,
            reply_to: None,
            payload,
        }
    }

    pub fn from_text(chat_id: ChatId, id: MessageId, text: impl Into<String>) -> Self {
        Self::new(chat_id, id, Payload::Text(text.into()))
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_thread(mut self, thread_id: ThreadId) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    pub fn with_reply_to(mut self, reply: ReplyRef) -> Self {
        self.reply_to = Some(reply);
        self
    }

    pub fn protected(mut self) -> Self {
        self.content_protected = true;
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.payload.text()
    }

    /// Reference usable as the reply target / anchor of another message
    pub fn as_reply_ref(&self) -> ReplyRef {
        ReplyRef { id: self.id, date: self.date }
    }
}
