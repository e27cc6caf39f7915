//! Recording ChatClient for unit tests

use async_trait::async_trait;
use std::sync::Mutex;

use crate::application::errors::{ApiError, BotError};
use crate::domain::entities::{ChatId, ChatMessage, MessageId, ThreadId};
use crate::domain::traits::{BotInfo, ChatClient, HistoryQuery};

/// One recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch { anchor: MessageId, count: u32 },
    Delete(MessageId),
    Forward { ids: Vec<MessageId>, thread_id: Option<ThreadId> },
    Copy { id: MessageId, thread_id: Option<ThreadId> },
    SendText(String),
    Reply { to: MessageId, text: String },
    Edit { id: MessageId, text: String },
}

/// Build a window of text messages; ids listed in `protected` are content-protected
pub fn window(chat_id: ChatId, ids: &[i64], protected: &[i64]) -> Vec<ChatMessage> {
    ids.iter()
        .map(|&id| {
            let msg = ChatMessage::from_text(chat_id, MessageId(id), format!("message {}", id));
            if protected.contains(&id) {
                msg.protected()
            } else {
                msg
            }
        })
        .collect()
}

#[derive(Default)]
pub struct MockClient {
    history: Vec<ChatMessage>,
    calls: Mutex<Vec<Call>>,
    forward_failure: Option<(Option<usize>, String)>,
    copy_failure: Option<usize>,
    fail_delete: bool,
    fail_edit: bool,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Every forward attempt fails with `description`
    pub fn fail_forward_with(mut self, description: &str) -> Self {
        self.forward_failure = Some((None, description.to_string()));
        self
    }

    /// Only the forward attempt number `index` (0-based) fails
    pub fn fail_forward_at(mut self, index: usize, description: &str) -> Self {
        self.forward_failure = Some((Some(index), description.to_string()));
        self
    }

    pub fn fail_copy_at(mut self, index: usize) -> Self {
        self.copy_failure = Some(index);
        self
    }

    pub fn fail_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn fail_edit(mut self) -> Self {
        self.fail_edit = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn forward_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Forward { .. })).count()
    }

    pub fn copied_ids(&self) -> Vec<MessageId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Copy { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().expect("call log poisoned").push(call);
    }

    fn count_of(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn fetch_history(&self, _chat_id: ChatId, query: HistoryQuery) -> Result<Vec<ChatMessage>, BotError> {
        self.record(Call::Fetch { anchor: query.anchor.id, count: query.count });
        if !self.history.iter().any(|m| m.id == query.anchor.id) {
            return Ok(Vec::new());
        }
        Ok(self
            .history
            .iter()
            .filter(|m| m.id >= query.anchor.id)
            .filter(|m| query.before.map_or(true, |b| m.id < b))
            .take(query.count as usize)
            .cloned()
            .collect())
    }

    async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> Result<(), BotError> {
        self.record(Call::Delete(message_id));
        if self.fail_delete {
            return Err(BotError::Api(ApiError::new(Some(400), "Bad Request: message can't be deleted")));
        }
        Ok(())
    }

    async fn forward_messages(&self, _chat_id: ChatId, messages: &[ChatMessage], thread_id: Option<ThreadId>) -> Result<(), BotError> {
        let attempt = self.count_of(|c| matches!(c, Call::Forward { .. }));
        self.record(Call::Forward {
            ids: messages.iter().map(|m| m.id).collect(),
            thread_id,
        });
        match &self.forward_failure {
            Some((None, desc)) => Err(BotError::Api(ApiError::new(Some(400), desc.clone()))),
            Some((Some(at), desc)) if *at == attempt => Err(BotError::Api(ApiError::new(Some(400), desc.clone()))),
            _ => Ok(()),
        }
    }

    async fn copy_message(&self, _chat_id: ChatId, message: &ChatMessage, thread_id: Option<ThreadId>) -> Result<(), BotError> {
        let attempt = self.count_of(|c| matches!(c, Call::Copy { .. }));
        self.record(Call::Copy { id: message.id, thread_id });
        if self.copy_failure == Some(attempt) {
            return Err(BotError::Api(ApiError::new(Some(400), "Bad Request: message to copy not found")));
        }
        Ok(())
    }

    async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<(), BotError> {
        self.record(Call::SendText(text.to_string()));
        Ok(())
    }

    async fn reply_text(&self, _chat_id: ChatId, reply_to: MessageId, text: &str) -> Result<(), BotError> {
        self.record(Call::Reply { to: reply_to, text: text.to_string() });
        Ok(())
    }

    async fn edit_message(&self, _chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), BotError> {
        self.record(Call::Edit { id: message_id, text: text.to_string() });
        if self.fail_edit {
            return Err(BotError::Api(ApiError::new(Some(400), "Bad Request: message can't be edited")));
        }
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "1".to_string(),
            name: "mock".to_string(),
            username: "mock_bot".to_string(),
        }
    }
}
