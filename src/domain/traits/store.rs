use async_trait::async_trait;
use crate::domain::entities::{ChatId, ChatMessage, MessageId};
use crate::domain::traits::HistoryQuery;

/// Store of messages the bot has observed, queried in history windows
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn record(&self, message: ChatMessage);

    async fn forget(&self, chat_id: ChatId, message_id: MessageId);

    /// Messages from `query.anchor` onward, oldest first, at most `query.count`.
    /// Empty when the anchor itself is unknown.
    async fn window(&self, chat_id: ChatId, query: HistoryQuery) -> Vec<ChatMessage>;
}
