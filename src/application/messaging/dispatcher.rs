//! Message dispatcher - routes commands through middleware to plugins

use tracing::{debug, error};

use crate::domain::entities::ChatMessage;
use crate::domain::traits::ChatClient;
use crate::plugins::{PluginContext, PluginManager};
use super::middleware::{Middleware, MiddlewareChain};
use super::parser::CommandParser;

/// What happened to one incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Stopped by middleware
    Blocked,
    /// Not a command
    Ignored,
    /// A command nobody registered
    Unknown(String),
    Handled(String),
    /// The plugin returned an error (logged)
    Failed(String),
}

/// Message dispatcher - one shared instance serves every chat
pub struct Dispatcher {
    parser: CommandParser,
    middleware: MiddlewareChain,
    plugins: PluginManager,
}

impl Dispatcher {
    pub fn new(parser: CommandParser, plugins: PluginManager) -> Self {
        Self {
            parser,
            middleware: MiddlewareChain::new(),
            plugins,
        }
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware = self.middleware.add(middleware);
        self
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.plugins
    }

    /// Process one incoming message. Never fails: plugin errors are logged.
    pub async fn dispatch(&self, client: &dyn ChatClient, message: &ChatMessage) -> Dispatch {
        if let Err(e) = self.middleware.run(message) {
            debug!("[{}] {}", message.chat_id, e);
            return Dispatch::Blocked;
        }

        let Some(invocation) = message.text().and_then(|text| self.parser.parse(text)) else {
            return Dispatch::Ignored;
        };

        let Some(plugin) = self.plugins.get(&invocation.name) else {
            debug!("[{}] unknown command: {}", message.chat_id, invocation.name);
            return Dispatch::Unknown(invocation.name);
        };

        let ctx = PluginContext {
            client,
            message,
            prefix: self.parser.main_prefix(),
            plugins: &self.plugins,
        };

        match plugin.handle(&ctx, &invocation).await {
            Ok(()) => Dispatch::Handled(invocation.name),
            Err(e) => {
                error!("[{}] command {} failed: {}", message.chat_id, invocation.name, e);
                Dispatch::Failed(invocation.name)
            }
        }
    }
}
