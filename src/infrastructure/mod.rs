//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Observed message history
//! - Adapters: Platform integrations (Telegram, console)

pub mod config;
pub mod storage;
pub mod adapters;
