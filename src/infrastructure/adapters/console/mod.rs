//! Console adapter for development/testing
//!
//! Simulates a single chat on stdin/stdout. Every line becomes a message;
//! `>>N text` replies to message N and a leading `!` marks the message as
//! content-protected.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::application::errors::{ApiError, BotError};
use crate::domain::entities::{ChatId, ChatMessage, MessageId, Payload, ThreadId};
use crate::domain::traits::{BotInfo, ChatClient, HistoryQuery, HistoryStore};
use crate::infrastructure::storage::MemoryHistory;

/// The one chat the console simulates
pub const CONSOLE_CHAT: ChatId = ChatId(0);

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
    history: MemoryHistory,
    next_id: AtomicI64,
}

impl ConsoleAdapter {
    pub fn new(capacity: usize) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "repeater-bot".to_string(),
                username: "console".to_string(),
            },
            history: MemoryHistory::new(capacity),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Append a message authored by the bot and echo it
    async fn post(&self, payload: Payload, content_protected: bool, label: &str) -> MessageId {
        let id = self.allocate_id();
        let mut message = ChatMessage::new(CONSOLE_CHAT, id, payload);
        message.content_protected = content_protected;
        println!("[BOT #{}] {}{}", id, label, message.text().unwrap_or("[media]"));
        self.history.record(message).await;
        id
    }

    /// Turn one input line into a recorded chat message
    pub async fn ingest(&self, line: &str) -> ChatMessage {
        let mut text = line.trim();
        let mut reply_to = None;

        if let Some(rest) = text.strip_prefix(">>") {
            let (target, remainder) = rest.split_once(' ').unwrap_or((rest, ""));
            if let Ok(id) = target.parse::<i64>() {
                reply_to = self
                    .history
                    .get(CONSOLE_CHAT, MessageId(id))
                    .await
                    .map(|m| m.as_reply_ref());
                text = remainder.trim();
            }
        }

        let protected = text.starts_with('!');
        let text = text.trim_start_matches('!');

        let mut message = ChatMessage::from_text(CONSOLE_CHAT, self.allocate_id(), text);
        message.content_protected = protected;
        message.reply_to = reply_to;
        println!("[#{}] {}", message.id, text);
        self.history.record(message.clone()).await;
        message
    }
}

#[async_trait]
impl ChatClient for ConsoleAdapter {
    async fn fetch_history(&self, chat_id: ChatId, query: HistoryQuery) -> Result<Vec<ChatMessage>, BotError> {
        Ok(self.history.window(chat_id, query).await)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), BotError> {
        self.history.forget(chat_id, message_id).await;
        println!("[BOT] deleted #{}", message_id);
        Ok(())
    }

    async fn forward_messages(&self, _chat_id: ChatId, messages: &[ChatMessage], _thread_id: Option<ThreadId>) -> Result<(), BotError> {
        if messages.iter().any(|m| m.content_protected) {
            return Err(ApiError::new(Some(400), "CHAT_FORWARDS_RESTRICTED").into());
        }
        for message in messages {
            self.post(message.payload.clone(), false, &format!("(fwd #{}) ", message.id)).await;
        }
        Ok(())
    }

    async fn copy_message(&self, _chat_id: ChatId, message: &ChatMessage, _thread_id: Option<ThreadId>) -> Result<(), BotError> {
        self.post(message.payload.clone(), message.content_protected, "").await;
        Ok(())
    }

    async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<(), BotError> {
        self.post(Payload::Text(text.to_string()), false, "").await;
        Ok(())
    }

    async fn reply_text(&self, _chat_id: ChatId, reply_to: MessageId, text: &str) -> Result<(), BotError> {
        self.post(Payload::Text(text.to_string()), false, &format!("(re #{}) ", reply_to)).await;
        Ok(())
    }

    async fn edit_message(&self, _chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), BotError> {
        println!("[BOT] edited #{}: {}", message_id, text);
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
