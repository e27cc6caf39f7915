//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: the repeat pipeline (history fetch, delivery, command handling)
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing, middleware, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
