//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod store;

pub use client::{BotInfo, ChatClient, Direction, HistoryQuery};
pub use store::HistoryStore;
