use async_trait::async_trait;

use crate::application::errors::BotError;
use crate::domain::entities::Invocation;
use crate::plugins::trait_def::{CommandPlugin, PluginContext};

/// `help [command]` - list commands, or show one command's usage
pub struct HelpPlugin;

impl HelpPlugin {
    fn render(ctx: &PluginContext<'_>, command: Option<&str>) -> String {
        if let Some(name) = command {
            let name = name.trim_start_matches(ctx.prefix);
            return match ctx.plugins.get(name) {
                Some(plugin) => {
                    let mut help = format!("{}{} - {}", ctx.prefix, plugin.name(), plugin.description());
                    if let Some(usage) = plugin.usage() {
                        help.push_str(&format!("\nUsage: {}{} {}", ctx.prefix, plugin.name(), usage));
                    }
                    help
                }
                None => format!("Command {}{} not found", ctx.prefix, name),
            };
        }

        let mut help = "Available commands:\n".to_string();
        for info in ctx.plugins.list_plugins() {
            help.push_str(&format!("  {}{} - {}\n", ctx.prefix, info.name, info.description));
        }
        help
    }
}

#[async_trait]
impl CommandPlugin for HelpPlugin {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Show available commands"
    }

    fn usage(&self) -> Option<&str> {
        Some("[command]")
    }

    async fn handle(&self, ctx: &PluginContext<'_>, invocation: &Invocation) -> Result<(), BotError> {
        ctx.reply(&Self::render(ctx, invocation.arg(0))).await
    }
}
