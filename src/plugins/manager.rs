//! Plugin manager - lookup table from command name to handler

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::application::errors::CommandError;
use super::trait_def::CommandPlugin;

/// Registered commands, keyed by lower-case name
#[derive(Default)]
pub struct PluginManager {
    plugins: BTreeMap<String, Arc<dyn CommandPlugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    pub fn register<P: CommandPlugin + 'static>(&mut self, plugin: P) -> Result<(), CommandError> {
        let name = plugin.name().to_lowercase();

        if self.plugins.contains_key(&name) {
            return Err(CommandError::Duplicate(name));
        }

        info!("Registering command: {}", name);
        self.plugins.insert(name, Arc::new(plugin));
        Ok(())
    }

    /// Look a command up by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn CommandPlugin>> {
        self.plugins.get(&name.to_lowercase()).cloned()
    }

    /// List all registered commands, sorted by name
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        self.plugins.values().map(|plugin| {
            PluginInfo {
                name: plugin.name().to_string(),
                description: plugin.description().to_string(),
                usage: plugin.usage().map(str::to_string),
            }
        }).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Plugin information for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub description: String,
    pub usage: Option<String>,
}
