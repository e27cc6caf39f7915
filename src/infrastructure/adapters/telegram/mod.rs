//! Telegram adapter

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::errors::{ApiError, BotError};
use crate::domain::entities::{ChatId, ChatMessage, MessageId, Payload, ReplyRef, ThreadId};
use crate::domain::traits::{BotInfo, ChatClient, HistoryQuery, HistoryStore};
use crate::plugins::PluginInfo;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Media fields checked, in order, to name a non-text payload
const MEDIA_KINDS: &[&str] = &[
    "photo", "video", "animation", "document", "audio", "voice",
    "video_note", "sticker", "location", "contact", "poll",
];

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub date: i64,
    pub message_thread_id: Option<i64>,
    #[serde(default)]
    pub is_topic_message: bool,
    #[serde(default)]
    pub has_protected_content: bool,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub reply_to_message: Option<Box<Message>>,
    /// Remaining fields, used to tell media kinds apart
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

impl Message {
    fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.date, 0).unwrap_or_default()
    }

    fn payload(&self) -> Payload {
        if let Some(text) = &self.text {
            return Payload::Text(text.clone());
        }
        match MEDIA_KINDS.iter().find(|k| self.extra.contains_key(**k)) {
            Some(kind) => Payload::Media {
                kind: kind.to_string(),
                caption: self.caption.clone(),
            },
            None => Payload::Empty,
        }
    }

    /// The explicit reply target. Inside forum topics Telegram points
    /// `reply_to_message` at the topic root when there is no real reply.
    fn reply_target(&self) -> Option<&Message> {
        let reply = self.reply_to_message.as_deref()?;
        if self.is_topic_message && Some(reply.message_id) == self.message_thread_id {
            return None;
        }
        Some(reply)
    }

    /// Convert into the platform-neutral message
    pub fn to_chat_message(&self) -> ChatMessage {
        let mut message = ChatMessage::new(ChatId(self.chat.id), MessageId(self.message_id), self.payload())
            .with_date(self.timestamp());
        message.content_protected = self.has_protected_content;
        if let Some(thread) = self.message_thread_id.filter(|_| self.is_topic_message) {
            message = message.with_thread(ThreadId(thread));
        }
        if let Some(reply) = self.reply_target() {
            message = message.with_reply_to(ReplyRef {
                id: MessageId(reply.message_id),
                date: reply.timestamp(),
            });
        }
        message
    }
}

#[derive(Debug, Serialize)]
struct ReplyParameters {
    message_id: i64,
    /// Still answer when the command was deleted meanwhile
    allow_sending_without_reply: bool,
}

#[derive(Debug, Serialize)]
struct ReplyMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    reply_parameters: ReplyParameters,
}

fn reply_request(chat_id: ChatId, reply_to: MessageId, text: &str) -> ReplyMessageRequest<'_> {
    ReplyMessageRequest {
        chat_id: chat_id.0,
        text,
        reply_parameters: ReplyParameters {
            message_id: reply_to.0,
            allow_sending_without_reply: true,
        },
    }
}

/// Telegram bot adapter
///
/// The Bot API cannot read chat history, so history windows are served from
/// the messages this adapter has observed.
pub struct TelegramAdapter {
    token: String,
    client: Client,
    info: BotInfo,
    history: Arc<dyn HistoryStore>,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "repeater-bot".to_string(),
                username: "repeater_bot".to_string(),
            },
            history,
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Call a Bot API method, turning `ok: false` answers into classified errors
    async fn call<B: Serialize + ?Sized, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, BotError> {
        let response = self.client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let data: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BotError::Parse(format!("{} ({}): {}", method, status, e)))?;

        if !data.ok {
            let description = data.description.unwrap_or_else(|| format!("{} failed with {}", method, status));
            return Err(ApiError::new(data.error_code, description).into());
        }

        data.result
            .ok_or_else(|| BotError::Parse(format!("{}: missing result", method)))
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct BotInfoResponse {
            id: i64,
            first_name: String,
            username: String,
        }

        let me: BotInfoResponse = self.call("getMe", &serde_json::json!({})).await?;

        self.info = BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<String>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message".to_string()],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
    }

    /// Record an update's message (and its reply target) into history and
    /// return it for dispatch
    pub async fn observe(&self, update: &Update) -> Option<ChatMessage> {
        let raw = update.message.as_ref()?;
        if let Some(reply) = raw.reply_target() {
            self.history.record(reply.to_chat_message()).await;
        }
        let message = raw.to_chat_message();
        self.history.record(message.clone()).await;
        Some(message)
    }

    /// Register bot commands with Telegram
    pub async fn register_commands(&self, commands: &[PluginInfo]) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct Command {
            command: String,
            description: String,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest {
            commands: Vec<Command>,
        }

        let request = SetMyCommandsRequest {
            commands: commands.iter().map(|c| Command {
                command: c.name.clone(),
                description: c.description.clone(),
            }).collect(),
        };

        let _: bool = self.call("setMyCommands", &request).await?;
        tracing::info!("Registered {} bot commands with Telegram", commands.len());
        Ok(())
    }
}

#[async_trait]
impl ChatClient for TelegramAdapter {
    async fn fetch_history(&self, chat_id: ChatId, query: HistoryQuery) -> Result<Vec<ChatMessage>, BotError> {
        Ok(self.history.window(chat_id, query).await)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct DeleteMessageRequest {
            chat_id: i64,
            message_id: i64,
        }

        let request = DeleteMessageRequest {
            chat_id: chat_id.0,
            message_id: message_id.0,
        };
        let _: bool = self.call("deleteMessage", &request).await?;
        self.history.forget(chat_id, message_id).await;
        Ok(())
    }

    async fn forward_messages(&self, chat_id: ChatId, messages: &[ChatMessage], thread_id: Option<ThreadId>) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct ForwardMessagesRequest {
            chat_id: i64,
            from_chat_id: i64,
            message_ids: Vec<i64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            message_thread_id: Option<i64>,
        }

        let Some(first) = messages.first() else {
            return Ok(());
        };

        let request = ForwardMessagesRequest {
            chat_id: chat_id.0,
            from_chat_id: first.chat_id.0,
            message_ids: messages.iter().map(|m| m.id.0).collect(),
            message_thread_id: thread_id.map(|t| t.0),
        };
        let _: serde_json::Value = self.call("forwardMessages", &request).await?;
        Ok(())
    }

    async fn copy_message(&self, chat_id: ChatId, message: &ChatMessage, thread_id: Option<ThreadId>) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct CopyMessageRequest {
            chat_id: i64,
            from_chat_id: i64,
            message_id: i64,
            #[serde(skip_serializing_if = "Option::is_none")]
            message_thread_id: Option<i64>,
        }

        let request = CopyMessageRequest {
            chat_id: chat_id.0,
            from_chat_id: message.chat_id.0,
            message_id: message.id.0,
            message_thread_id: thread_id.map(|t| t.0),
        };
        let _: serde_json::Value = self.call("copyMessage", &request).await?;
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), BotError> {
        tracing::debug!("Sending to {}: {}", chat_id, text);

        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: i64,
            text: &'a str,
        }

        let _: serde_json::Value = self.call("sendMessage", &SendMessageRequest { chat_id: chat_id.0, text }).await?;
        Ok(())
    }

    async fn reply_text(&self, chat_id: ChatId, reply_to: MessageId, text: &str) -> Result<(), BotError> {
        let _: serde_json::Value = self.call("sendMessage", &reply_request(chat_id, reply_to, text)).await?;
        Ok(())
    }

    async fn edit_message(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct EditMessageTextRequest<'a> {
            chat_id: i64,
            message_id: i64,
            text: &'a str,
        }

        let request = EditMessageTextRequest {
            chat_id: chat_id.0,
            message_id: message_id.0,
            text,
        };
        let _: serde_json::Value = self.call("editMessageText", &request).await?;
        Ok(())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
