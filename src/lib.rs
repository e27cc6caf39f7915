//! repeater-bot - a chat bot whose `re` command repeats a window of chat
//! history, forwarding natively when the chat allows it and copying otherwise.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod plugins;
