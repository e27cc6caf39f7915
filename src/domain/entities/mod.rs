//! Domain entities - Core business objects with no platform dependencies

pub mod message;
pub mod command;
pub mod request;

pub use message::{Anchor, ChatId, ChatMessage, MessageId, Payload, ReplyRef, ThreadId};
pub use command::Invocation;
pub use request::{parse_positive, RepeatLimits, RepeatRequest};
