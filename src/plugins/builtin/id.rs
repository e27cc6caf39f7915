use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::Invocation;
use crate::plugins::trait_def::{CommandPlugin, PluginContext};

/// `id` - show the current chat id, handy for filling in `chats.allowed`
pub struct IdPlugin;

#[async_trait]
impl CommandPlugin for IdPlugin {
    fn name(&self) -> &str {
        "id"
    }

    fn description(&self) -> &str {
        "Show this chat's id"
    }

    async fn handle(&self, ctx: &PluginContext<'_>, _invocation: &Invocation) -> Result<(), BotError> {
        ctx.reply(&format!("chatId: {}", ctx.message.chat_id)).await
    }
}
