//! Command plugins for repeater-bot
//! 
//! Each chat command is one `CommandPlugin`; the `PluginManager` maps
//! command names to them.

pub mod manager;
pub mod trait_def;
pub mod builtin;

pub use manager::{PluginInfo, PluginManager};
pub use trait_def::{CommandPlugin, PluginContext};

use crate::application::errors::CommandError;
use crate::application::services::RepeatHandler;

/// A manager with every built-in command registered
pub fn default_plugins(repeat: RepeatHandler) -> Result<PluginManager, CommandError> {
    let mut manager = PluginManager::new();
    manager.register(builtin::PingPlugin)?;
    manager.register(builtin::IdPlugin)?;
    manager.register(builtin::HelpPlugin)?;
    manager.register(builtin::RePlugin::new(repeat))?;
    Ok(manager)
}
