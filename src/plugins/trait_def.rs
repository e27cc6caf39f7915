//! Plugin trait definitions

use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatMessage, Invocation};
use crate::domain::traits::ChatClient;
use super::manager::PluginManager;

/// Everything a command handler may touch for one invocation
pub struct PluginContext<'a> {
    pub client: &'a dyn ChatClient,
    /// The message that triggered the command
    pub message: &'a ChatMessage,
    /// Main command prefix, for usage texts
    pub prefix: &'a str,
    pub plugins: &'a PluginManager,
}

impl PluginContext<'_> {
    /// Answer the command as a reply to it
    pub async fn reply(&self, text: &str) -> Result<(), BotError> {
        self.client.reply_text(self.message.chat_id, self.message.id, text).await
    }
}

/// A chat command; one implementation per command name
#[async_trait]
pub trait CommandPlugin: Send + Sync {
    /// Command name, without prefix
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Argument synopsis shown after the command name
    fn usage(&self) -> Option<&str> {
        None
    }

    async fn handle(&self, ctx: &PluginContext<'_>, invocation: &Invocation) -> Result<(), BotError>;
}
