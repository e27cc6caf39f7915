use async_trait::async_trait;
use crate::domain::entities::{Anchor, ChatId, ChatMessage, MessageId, ThreadId};
use crate::application::errors::BotError;

/// ChatClient trait - abstraction over the messaging platform client
///
/// Every method is a network round-trip and therefore a suspension point.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Fetch an ordered window of history anchored at `query.anchor`
    async fn fetch_history(&self, chat_id: ChatId, query: HistoryQuery) -> Result<Vec<ChatMessage>, BotError>;

    /// Delete a message
    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), BotError>;

    /// Forward `messages` into `chat_id` in one bulk operation, preserving order
    async fn forward_messages(&self, chat_id: ChatId, messages: &[ChatMessage], thread_id: Option<ThreadId>) -> Result<(), BotError>;

    /// Re-create a single message in `chat_id`
    async fn copy_message(&self, chat_id: ChatId, message: &ChatMessage, thread_id: Option<ThreadId>) -> Result<(), BotError>;

    /// Send a plain text message
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), BotError>;

    /// Send a plain text message as a reply to another message.
    /// Platforms without replies just send it.
    async fn reply_text(&self, chat_id: ChatId, _reply_to: MessageId, text: &str) -> Result<(), BotError> {
        self.send_text(chat_id, text).await
    }

    /// Replace the text of an existing message
    async fn edit_message(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), BotError>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Direction a history window extends from its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Oldest first, starting at the anchor
    #[default]
    Forward,
}

/// History window query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub anchor: Anchor,
    pub count: u32,
    pub direction: Direction,
    /// Exclusive upper bound on message ids
    pub before: Option<MessageId>,
}

impl HistoryQuery {
    pub fn forward(anchor: Anchor, count: u32) -> Self {
        Self {
            anchor,
            count,
            direction: Direction::Forward,
            before: None,
        }
    }

    pub fn before(mut self, id: MessageId) -> Self {
        self.before = Some(id);
        self
    }
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
