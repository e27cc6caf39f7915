//! Recording [`ChatClient`] for integration tests.
//!
//! History is served from a real [`MemoryHistory`], so windows behave the way
//! they do against observed updates. Every successful platform call is
//! recorded as a [`Sent`] entry for assertions.

use async_trait::async_trait;
use std::sync::{Mutex, Once};

use repeater_bot::application::errors::{ApiError, BotError};
use repeater_bot::domain::entities::{ChatId, ChatMessage, MessageId, ThreadId};
use repeater_bot::domain::traits::{BotInfo, ChatClient, HistoryQuery, HistoryStore};
use repeater_bot::infrastructure::storage::MemoryHistory;

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// One platform call that went through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Deleted(MessageId),
    Forwarded(Vec<MessageId>),
    Copied(MessageId),
    Text(String),
    Reply(MessageId, String),
    Edited(MessageId, String),
}

pub struct RecordingClient {
    history: MemoryHistory,
    sent: Mutex<Vec<Sent>>,
    /// Every forward is rejected with this description
    forward_error: Option<&'static str>,
}

impl RecordingClient {
    pub fn new() -> Self {
        ensure_init();
        Self {
            history: MemoryHistory::new(100),
            sent: Mutex::new(Vec::new()),
            forward_error: None,
        }
    }

    /// A chat that has forwarding disabled
    pub fn restricted() -> Self {
        Self {
            forward_error: Some("Bad Request: CHAT_FORWARDS_RESTRICTED"),
            ..Self::new()
        }
    }

    /// Forwards fail for a reason copying cannot work around
    pub fn failing_forwards(description: &'static str) -> Self {
        Self {
            forward_error: Some(description),
            ..Self::new()
        }
    }

    /// Record a message as if it had been observed in the chat
    pub async fn seed(&self, message: ChatMessage) -> ChatMessage {
        self.history.record(message.clone()).await;
        message
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub async fn is_known(&self, chat_id: ChatId, id: MessageId) -> bool {
        self.history.get(chat_id, id).await.is_some()
    }

    fn push(&self, entry: Sent) {
        self.sent.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn fetch_history(&self, chat_id: ChatId, query: HistoryQuery) -> Result<Vec<ChatMessage>, BotError> {
        Ok(self.history.window(chat_id, query).await)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), BotError> {
        self.history.forget(chat_id, message_id).await;
        self.push(Sent::Deleted(message_id));
        Ok(())
    }

    async fn forward_messages(&self, _chat_id: ChatId, messages: &[ChatMessage], _thread_id: Option<ThreadId>) -> Result<(), BotError> {
        if let Some(description) = self.forward_error {
            return Err(ApiError::new(Some(400), description).into());
        }
        if messages.iter().any(|m| m.content_protected) {
            return Err(ApiError::new(Some(400), "Bad Request: CHAT_FORWARDS_RESTRICTED").into());
        }
        self.push(Sent::Forwarded(messages.iter().map(|m| m.id).collect()));
        Ok(())
    }

    async fn copy_message(&self, _chat_id: ChatId, message: &ChatMessage, _thread_id: Option<ThreadId>) -> Result<(), BotError> {
        self.push(Sent::Copied(message.id));
        Ok(())
    }

    async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<(), BotError> {
        self.push(Sent::Text(text.to_string()));
        Ok(())
    }

    async fn reply_text(&self, _chat_id: ChatId, reply_to: MessageId, text: &str) -> Result<(), BotError> {
        self.push(Sent::Reply(reply_to, text.to_string()));
        Ok(())
    }

    async fn edit_message(&self, _chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), BotError> {
        self.push(Sent::Edited(message_id, text.to_string()));
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "1".to_string(),
            name: "repeater".to_string(),
            username: "repeater_bot".to_string(),
        }
    }
}
