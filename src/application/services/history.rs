use tracing::debug;

use crate::application::errors::BotError;
use crate::domain::entities::{ChatMessage, RepeatRequest};
use crate::domain::traits::{ChatClient, HistoryQuery};

/// Fetch the window a request repeats: messages from the anchor onward,
/// oldest first, at most `request.count` of them, never including the
/// triggering command itself.
///
/// An empty result means the anchor is no longer retrievable.
pub async fn fetch_window(client: &dyn ChatClient, request: &RepeatRequest) -> Result<Vec<ChatMessage>, BotError> {
    let query = HistoryQuery::forward(request.anchor, request.count).before(request.command_id);
    let mut window = client.fetch_history(request.chat_id, query).await?;

    window.retain(|m| m.id >= request.anchor.id && m.id < request.command_id);
    window.sort_by_key(|m| m.id);
    window.truncate(request.count as usize);

    debug!(
        "[{}] fetched {} message(s) from anchor {}",
        request.chat_id,
        window.len(),
        request.anchor.id
    );
    Ok(window)
}
