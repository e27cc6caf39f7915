use async_trait::async_trait;
use tracing::debug;

use crate::application::errors::BotError;
use crate::application::services::RepeatHandler;
use crate::domain::entities::Invocation;
use crate::plugins::trait_def::{CommandPlugin, PluginContext};

/// `re [count] [repeat]` - reply to a message to repeat it and the
/// `count - 1` messages after it, `repeat` times
pub struct RePlugin {
    handler: RepeatHandler,
}

impl RePlugin {
    pub fn new(handler: RepeatHandler) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl CommandPlugin for RePlugin {
    fn name(&self) -> &str {
        "re"
    }

    fn description(&self) -> &str {
        "Repeat the replied-to message (and the ones after it)"
    }

    fn usage(&self) -> Option<&str> {
        Some("[count] [repeat]")
    }

    async fn handle(&self, ctx: &PluginContext<'_>, invocation: &Invocation) -> Result<(), BotError> {
        // failures are already reported in the chat by the handler
        if let Err(e) = self.handler.execute(ctx.client, ctx.message, invocation).await {
            debug!("[{}] re ended without delivery: {}", ctx.message.chat_id, e);
        }
        Ok(())
    }
}
