//! Delivery strategy selection - forward the window natively when allowed,
//! otherwise copy it message by message.

use tracing::{debug, warn};

use crate::application::errors::{ApiError, BotError};
use crate::domain::entities::{ChatId, ChatMessage, ThreadId};
use crate::domain::traits::ChatClient;

/// Where repeated messages are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub chat_id: ChatId,
    pub thread_id: Option<ThreadId>,
}

/// How a window is re-emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One bulk forward per repetition
    Forward,
    /// One copy per message per repetition
    Copy,
}

/// Pick the cheapest strategy the window allows
pub fn select_strategy(window: &[ChatMessage]) -> Strategy {
    if window.iter().any(|m| m.content_protected) {
        Strategy::Copy
    } else {
        Strategy::Forward
    }
}

/// Result of delivering a window `repeat` times
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Every repetition went out as a bulk forward
    Forwarded { batches: u32 },
    /// Protected content; copied from the start
    Copied { messages: usize },
    /// Forwarding was restricted; the whole emission was redone by copying
    FellBackToCopy { messages: usize, cause: ApiError },
    Failed(BotError),
}

/// Emit `window` into `target` exactly `repeat` times.
///
/// Repetitions are sequential and each preserves window order. A forward
/// restriction abandons forwarding for the rest of the invocation and
/// restarts the full `repeat x window` emission with copies; any other
/// error fails the delivery.
pub async fn deliver(client: &dyn ChatClient, target: Target, window: &[ChatMessage], repeat: u32) -> DeliveryOutcome {
    match select_strategy(window) {
        Strategy::Copy => match copy_all(client, target, window, repeat).await {
            Ok(messages) => DeliveryOutcome::Copied { messages },
            Err(e) => DeliveryOutcome::Failed(e),
        },
        Strategy::Forward => match forward_all(client, target, window, repeat).await {
            Ok(batches) => DeliveryOutcome::Forwarded { batches },
            Err(BotError::Api(cause)) if cause.is_forward_restricted() => {
                warn!("[{}] forwarding restricted ({}), copying instead", target.chat_id, cause);
                match copy_all(client, target, window, repeat).await {
                    Ok(messages) => DeliveryOutcome::FellBackToCopy { messages, cause },
                    Err(e) => DeliveryOutcome::Failed(e),
                }
            }
            Err(e) => DeliveryOutcome::Failed(e),
        },
    }
}

async fn forward_all(client: &dyn ChatClient, target: Target, window: &[ChatMessage], repeat: u32) -> Result<u32, BotError> {
    for round in 0..repeat {
        client.forward_messages(target.chat_id, window, target.thread_id).await?;
        debug!("[{}] forwarded batch {}/{}", target.chat_id, round + 1, repeat);
    }
    Ok(repeat)
}

async fn copy_all(client: &dyn ChatClient, target: Target, window: &[ChatMessage], repeat: u32) -> Result<usize, BotError> {
    let mut sent = 0;
    for _ in 0..repeat {
        for message in window {
            client.copy_message(target.chat_id, message, target.thread_id).await?;
            sent += 1;
        }
    }
    debug!("[{}] copied {} message(s)", target.chat_id, sent);
    Ok(sent)
}
