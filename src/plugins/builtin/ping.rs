use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::Invocation;
use crate::plugins::trait_def::{CommandPlugin, PluginContext};

/// `ping` - liveness check
pub struct PingPlugin;

#[async_trait]
impl CommandPlugin for PingPlugin {
    fn name(&self) -> &str {
        "ping"
    }

    fn description(&self) -> &str {
        "Check the bot is alive"
    }

    async fn handle(&self, ctx: &PluginContext<'_>, _invocation: &Invocation) -> Result<(), BotError> {
        ctx.reply("pong").await
    }
}
