//! Message handling - Event-driven message processing

pub mod dispatcher;
pub mod middleware;
pub mod parser;

pub use dispatcher::{Dispatch, Dispatcher};
pub use middleware::{AllowedChats, LoggingMiddleware, Middleware, MiddlewareChain, MiddlewareError};
pub use parser::CommandParser;
