//! Domain layer - Core business logic with no platform dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (ChatMessage, RepeatRequest, Invocation)
//! - Traits: Abstractions for infrastructure (ChatClient, HistoryStore)

pub mod entities;
pub mod traits;
