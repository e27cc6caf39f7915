//! The `re` command: repeat a window of chat history anchored at the
//! replied-to message.
//!
//! Flow: `Idle -> ResolvingReply -> Fetching -> Delivering -> Done | Failed`.
//! Every failure is reported in the chat; nothing escapes to the caller's
//! task as an error.

use tracing::{debug, error, info, warn};

use crate::application::errors::RepeatError;
use crate::domain::entities::{ChatMessage, Invocation, RepeatLimits, RepeatRequest};
use crate::domain::traits::ChatClient;
use super::delivery::{deliver, DeliveryOutcome, Target};
use super::history::fetch_window;

pub const NO_REPLY_TEXT: &str = "You must reply to a message to repeat it.";
pub const EMPTY_WINDOW_TEXT: &str = "No message could be retrieved to repeat.";
pub const DELIVERY_FAILED_TEXT: &str = "Sorry, an error occurred and the messages could not be repeated. Please try again later.";
pub const REPEAT_CAPPED_TEXT: &str = "Repeat count was limited to";

/// Progress of one invocation
#[derive(Debug)]
pub enum RepeatState {
    Idle,
    ResolvingReply,
    Fetching(RepeatRequest),
    Delivering(RepeatRequest, Vec<ChatMessage>),
    Done(DeliveryOutcome),
    Failed(RepeatError),
}

/// Stateless handler; one instance serves every chat concurrently
#[derive(Debug, Clone, Default)]
pub struct RepeatHandler {
    limits: RepeatLimits,
}

impl RepeatHandler {
    pub fn new(limits: RepeatLimits) -> Self {
        Self { limits }
    }

    /// Run one invocation to completion and report failures in the chat.
    ///
    /// Returns the terminal state's payload so callers can log it.
    pub async fn execute(&self, client: &dyn ChatClient, command: &ChatMessage, invocation: &Invocation) -> Result<DeliveryOutcome, RepeatError> {
        let mut state = RepeatState::Idle;
        loop {
            state = match state {
                RepeatState::Idle => RepeatState::ResolvingReply,
                RepeatState::ResolvingReply => match command.reply_to {
                    Some(reply) => RepeatState::Fetching(RepeatRequest::from_invocation(command, reply, invocation, self.limits)),
                    None => RepeatState::Failed(RepeatError::NoReplyTarget),
                },
                RepeatState::Fetching(request) => match fetch_window(client, &request).await {
                    Ok(window) if window.is_empty() => RepeatState::Failed(RepeatError::EmptyWindow),
                    Ok(window) => {
                        remove_command(client, &request).await;
                        RepeatState::Delivering(request, window)
                    }
                    Err(e) => RepeatState::Failed(RepeatError::Fetch(e)),
                },
                RepeatState::Delivering(request, window) => {
                    let target = Target {
                        chat_id: request.chat_id,
                        thread_id: request.thread_id,
                    };
                    match deliver(client, target, &window, request.repeat).await {
                        DeliveryOutcome::Failed(e) => RepeatState::Failed(RepeatError::Delivery(e)),
                        outcome => {
                            if let Some(requested) = request.requested_repeat {
                                announce_cap(client, &request, requested).await;
                            }
                            RepeatState::Done(outcome)
                        }
                    }
                }
                RepeatState::Done(outcome) => {
                    info!("[{}] repeat finished: {:?}", command.chat_id, outcome);
                    return Ok(outcome);
                }
                RepeatState::Failed(failure) => {
                    self.report(client, command, &failure).await;
                    return Err(failure);
                }
            };
        }
    }

    async fn report(&self, client: &dyn ChatClient, command: &ChatMessage, failure: &RepeatError) {
        match failure {
            RepeatError::NoReplyTarget => notify(client, command, NO_REPLY_TEXT).await,
            RepeatError::EmptyWindow => notify(client, command, EMPTY_WINDOW_TEXT).await,
            RepeatError::Fetch(e) | RepeatError::Delivery(e) => {
                error!("[{}] repeat failed: {}", command.chat_id, failure);
                let text = format!("{}\n{}", DELIVERY_FAILED_TEXT, e);
                if let Err(send_err) = client.send_text(command.chat_id, &text).await {
                    error!("[{}] could not report failure: {}", command.chat_id, send_err);
                }
            }
        }
    }
}

/// Delete the triggering command. Failure is logged and otherwise ignored:
/// delivery never waits on or depends on this outcome.
async fn remove_command(client: &dyn ChatClient, request: &RepeatRequest) {
    match client.delete_message(request.chat_id, request.command_id).await {
        Ok(()) => debug!("[{}] removed command message {}", request.chat_id, request.command_id),
        Err(e) => warn!("[{}] could not remove command message {}: {}", request.chat_id, request.command_id, e),
    }
}

/// Tell the chat that fewer repetitions went out than were asked for
async fn announce_cap(client: &dyn ChatClient, request: &RepeatRequest, requested: u32) {
    info!("[{}] repeat capped at {} (asked for {})", request.chat_id, request.repeat, requested);
    let text = format!("{} {} (asked for {}).", REPEAT_CAPPED_TEXT, request.repeat, requested);
    if let Err(e) = client.send_text(request.chat_id, &text).await {
        warn!("[{}] could not announce repeat cap: {}", request.chat_id, e);
    }
}

/// Replace the command text with `text`, or post it when the command cannot be edited
async fn notify(client: &dyn ChatClient, command: &ChatMessage, text: &str) {
    if let Err(e) = client.edit_message(command.chat_id, command.id, text).await {
        debug!("[{}] edit failed ({}), sending instead", command.chat_id, e);
        if let Err(e) = client.send_text(command.chat_id, text).await {
            error!("[{}] could not send notice: {}", command.chat_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::test_support::{window, Call, MockClient};
    use crate::domain::entities::{ChatId, MessageId, ThreadId};

    const CHAT: ChatId = ChatId(-42);

    fn command_replying_to(target: Option<&ChatMessage>, args: &[&str]) -> (ChatMessage, Invocation) {
        let mut text = String::from("/re");
        for arg in args {
            text.push(' ');
            text.push_str(arg);
        }
        let mut command = ChatMessage::from_text(CHAT, MessageId(100), text);
        if let Some(target) = target {
            command = command.with_reply_to(target.as_reply_ref());
        }
        let invocation = Invocation::new("re", args.iter().map(|s| s.to_string()).collect());
        (command, invocation)
    }

    #[tokio::test]
    async fn test_not_a_reply_edits_command_and_never_fetches() {
        let client = MockClient::new();
        let (command, invocation) = command_replying_to(None, &["3"]);

        let result = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert!(matches!(result, Err(RepeatError::NoReplyTarget)));
        assert_eq!(
            client.calls(),
            vec![Call::Edit { id: MessageId(100), text: NO_REPLY_TEXT.to_string() }]
        );
    }

    #[tokio::test]
    async fn test_edit_failure_falls_back_to_send() {
        let client = MockClient::new().fail_edit();
        let (command, invocation) = command_replying_to(None, &[]);

        let _ = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert_eq!(client.calls().last(), Some(&Call::SendText(NO_REPLY_TEXT.to_string())));
    }

    #[tokio::test]
    async fn test_empty_window_reports_and_touches_nothing() {
        let history = window(CHAT, &[1, 2, 3], &[]);
        let gone = ChatMessage::from_text(CHAT, MessageId(50), "deleted meanwhile");
        let client = MockClient::new().with_history(history);
        let (command, invocation) = command_replying_to(Some(&gone), &["2"]);

        let result = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert!(matches!(result, Err(RepeatError::EmptyWindow)));
        let calls = client.calls();
        assert!(calls.iter().all(|c| !matches!(c, Call::Delete(_) | Call::Forward { .. } | Call::Copy { .. })));
        assert!(calls.contains(&Call::Edit { id: MessageId(100), text: EMPTY_WINDOW_TEXT.to_string() }));
    }

    #[tokio::test]
    async fn test_forward_scenario_deletes_then_forwards() {
        let history = window(CHAT, &[10, 11, 12, 13], &[]);
        let client = MockClient::new().with_history(history.clone());
        let (command, invocation) = command_replying_to(Some(&history[0]), &["3", "2"]);

        let result = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert!(matches!(result, Ok(DeliveryOutcome::Forwarded { batches: 2 })));
        let ids = vec![MessageId(10), MessageId(11), MessageId(12)];
        assert_eq!(
            client.calls(),
            vec![
                Call::Fetch { anchor: MessageId(10), count: 3 },
                Call::Delete(MessageId(100)),
                Call::Forward { ids: ids.clone(), thread_id: None },
                Call::Forward { ids, thread_id: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_window_excludes_the_command_itself() {
        let mut history = window(CHAT, &[98, 99], &[]);
        history.push(ChatMessage::from_text(CHAT, MessageId(100), "/re 5"));
        let client = MockClient::new().with_history(history.clone());
        let (command, invocation) = command_replying_to(Some(&history[0]), &["5"]);

        let _ = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert_eq!(client.forward_count(), 1);
        assert!(client.calls().contains(&Call::Forward {
            ids: vec![MessageId(98), MessageId(99)],
            thread_id: None
        }));
    }

    #[tokio::test]
    async fn test_delete_failure_does_not_block_delivery() {
        let history = window(CHAT, &[1, 2], &[1]);
        let client = MockClient::new().with_history(history.clone()).fail_delete();
        let (command, invocation) = command_replying_to(Some(&history[0]), &["2", "2"]);

        let result = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert!(matches!(result, Ok(DeliveryOutcome::Copied { messages: 4 })));
    }

    #[tokio::test]
    async fn test_delivery_failure_sends_apology_with_cause() {
        let history = window(CHAT, &[1, 2], &[]);
        let client = MockClient::new()
            .with_history(history.clone())
            .fail_forward_with("Bad Request: message to forward not found");
        let (command, invocation) = command_replying_to(Some(&history[0]), &["2"]);

        let result = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert!(matches!(result, Err(RepeatError::Delivery(_))));
        match client.calls().last() {
            Some(Call::SendText(text)) => {
                assert!(text.starts_with(DELIVERY_FAILED_TEXT));
                assert!(text.contains("message to forward not found"));
            }
            other => panic!("expected apology, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_configured_repeat_cap_is_announced() {
        let history = window(CHAT, &[1], &[]);
        let client = MockClient::new().with_history(history.clone());
        let (command, invocation) = command_replying_to(Some(&history[0]), &["1", "5"]);
        let handler = RepeatHandler::new(RepeatLimits { max_count: 100, max_repeat: Some(2) });

        let result = handler.execute(&client, &command, &invocation).await;

        assert!(matches!(result, Ok(DeliveryOutcome::Forwarded { batches: 2 })));
        assert_eq!(
            client.calls().last(),
            Some(&Call::SendText(format!("{} 2 (asked for 5).", REPEAT_CAPPED_TEXT)))
        );
    }

    #[tokio::test]
    async fn test_uncapped_repeat_sends_no_notice() {
        let history = window(CHAT, &[1], &[]);
        let client = MockClient::new().with_history(history.clone());
        let (command, invocation) = command_replying_to(Some(&history[0]), &["1", "25"]);

        let _ = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert_eq!(client.forward_count(), 25);
        assert!(client.calls().iter().all(|c| !matches!(c, Call::SendText(_))));
    }

    #[tokio::test]
    async fn test_thread_of_command_is_targeted() {
        let history = window(CHAT, &[7], &[]);
        let client = MockClient::new().with_history(history.clone());
        let (command, invocation) = command_replying_to(Some(&history[0]), &[]);
        let command = command.with_thread(ThreadId(77));

        let _ = RepeatHandler::default().execute(&client, &command, &invocation).await;

        assert!(client.calls().contains(&Call::Forward {
            ids: vec![MessageId(7)],
            thread_id: Some(ThreadId(77))
        }));
    }
}
