//! In-memory history of observed messages

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{ChatId, ChatMessage, MessageId};
use crate::domain::traits::{Direction, HistoryQuery, HistoryStore};

/// Per-chat message history, oldest entries evicted past `capacity`
#[derive(Clone)]
pub struct MemoryHistory {
    capacity: usize,
    chats: Arc<RwLock<HashMap<ChatId, BTreeMap<MessageId, ChatMessage>>>>,
}

impl MemoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            chats: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, chat_id: ChatId, message_id: MessageId) -> Option<ChatMessage> {
        self.chats.read().await.get(&chat_id)?.get(&message_id).cloned()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn record(&self, message: ChatMessage) {
        let mut chats = self.chats.write().await;
        let history = chats.entry(message.chat_id).or_default();
        history.insert(message.id, message);

        while history.len() > self.capacity {
            history.pop_first();
        }
    }

    async fn forget(&self, chat_id: ChatId, message_id: MessageId) {
        let mut chats = self.chats.write().await;
        if let Some(history) = chats.get_mut(&chat_id) {
            history.remove(&message_id);
        }
    }

    async fn window(&self, chat_id: ChatId, query: HistoryQuery) -> Vec<ChatMessage> {
        let chats = self.chats.read().await;
        let Some(history) = chats.get(&chat_id) else {
            return Vec::new();
        };
        if !history.contains_key(&query.anchor.id) {
            return Vec::new();
        }

        match query.direction {
            Direction::Forward => history
                .range(query.anchor.id..)
                .map(|(_, m)| m)
                .take_while(|m| query.before.map_or(true, |before| m.id < before))
                .take(query.count as usize)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: ChatId = ChatId(5);

    async fn store_with(ids: &[i64]) -> MemoryHistory {
        let store = MemoryHistory::new(100);
        for &id in ids {
            store.record(ChatMessage::from_text(CHAT, MessageId(id), format!("m{}", id))).await;
        }
        store
    }

    fn query(anchor: &ChatMessage, count: u32) -> HistoryQuery {
        HistoryQuery::forward(anchor.as_reply_ref().into(), count)
    }

    fn ids(window: &[ChatMessage]) -> Vec<i64> {
        window.iter().map(|m| m.id.0).collect()
    }

    #[tokio::test]
    async fn test_window_starts_at_anchor_ascending_and_bounded() {
        // recorded out of order on purpose
        let store = store_with(&[4, 1, 3, 2, 5]).await;
        let anchor = ChatMessage::from_text(CHAT, MessageId(2), "");

        let window = store.window(CHAT, query(&anchor, 3)).await;

        assert_eq!(ids(&window), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_window_stops_before_bound() {
        let store = store_with(&[1, 2, 3, 4]).await;
        let anchor = ChatMessage::from_text(CHAT, MessageId(1), "");

        let window = store.window(CHAT, query(&anchor, 10).before(MessageId(3))).await;

        assert_eq!(ids(&window), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unknown_or_forgotten_anchor_gives_empty_window() {
        let store = store_with(&[1, 2, 3]).await;
        let anchor = ChatMessage::from_text(CHAT, MessageId(2), "");

        store.forget(CHAT, MessageId(2)).await;

        assert!(store.window(CHAT, query(&anchor, 2)).await.is_empty());
        assert!(store.window(ChatId(99), query(&anchor, 2)).await.is_empty());
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let store = MemoryHistory::new(2);
        for id in 1..=3 {
            store.record(ChatMessage::from_text(CHAT, MessageId(id), "")).await;
        }

        assert!(store.get(CHAT, MessageId(1)).await.is_none());
        assert!(store.get(CHAT, MessageId(2)).await.is_some());
        assert!(store.get(CHAT, MessageId(3)).await.is_some());
        let anchor = ChatMessage::from_text(CHAT, MessageId(1), "");
        assert!(store.window(CHAT, query(&anchor, 1)).await.is_empty());
    }
}
