use super::{Anchor, ChatId, ChatMessage, Invocation, MessageId, ReplyRef, ThreadId};

/// Upper bounds applied to parsed `count` / `repeat` values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatLimits {
    /// Bulk-forward ceiling of the platform
    pub max_count: u32,
    /// Opt-in cap on repetitions; `None` repeats as often as asked
    pub max_repeat: Option<u32>,
}

impl Default for RepeatLimits {
    fn default() -> Self {
        Self {
            max_count: 100,
            max_repeat: None,
        }
    }
}

/// Parse the leading numeric portion of `value` as a positive integer.
///
/// Leading whitespace and a sign are accepted, trailing garbage is ignored
/// (`"3x"` is 3). Missing, non-numeric, zero and negative input all yield
/// `fallback`.
pub fn parse_positive(value: Option<&str>, fallback: u32) -> u32 {
    let Some(value) = value else {
        return fallback;
    };

    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        &digits[..end]
    };
    if digits.is_empty() || negative {
        return fallback;
    }

    let parsed = digits.bytes().fold(0u64, |acc, b| {
        acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
    });
    match u32::try_from(parsed) {
        Ok(0) => fallback,
        Ok(n) => n,
        Err(_) => u32::MAX,
    }
}

/// One parsed `re` invocation, anchored at the replied-to message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatRequest {
    pub chat_id: ChatId,
    pub anchor: Anchor,
    /// The triggering command; excluded from the window and deleted before delivery
    pub command_id: MessageId,
    pub count: u32,
    pub repeat: u32,
    /// What the user asked for, when `repeat` was cut down to the configured cap
    pub requested_repeat: Option<u32>,
    pub thread_id: Option<ThreadId>,
}

impl RepeatRequest {
    /// Build a request from the command message, its reply target and the
    /// command arguments `[count] [repeat]`.
    pub fn from_invocation(
        command: &ChatMessage,
        reply: ReplyRef,
        invocation: &Invocation,
        limits: RepeatLimits,
    ) -> Self {
        let count = parse_positive(invocation.arg(0), 1).min(limits.max_count.max(1));
        let requested = parse_positive(invocation.arg(1), 1);
        let repeat = match limits.max_repeat {
            Some(cap) => requested.min(cap.max(1)),
            None => requested,
        };

        Self {
            chat_id: command.chat_id,
            anchor: reply.into(),
            command_id: command.id,
            count,
            repeat,
            requested_repeat: (repeat < requested).then_some(requested),
            thread_id: command.thread_id,
        }
    }
}
