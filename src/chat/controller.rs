//! Conversation state machine.
//!
//! `Idle -> AwaitingReply -> Idle`, with no terminal state. The controller
//! performs no I/O: `submit` hands back the request to dispatch and `resolve`
//! folds the outcome back in. At most one request is outstanding at a time.

use tracing::{debug, warn};

use super::conversation_state::{ConversationState, EmptyMessage, Message};
use crate::advice::{AdviceFault, FallbackTable, Turn, WidgetCopy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    AwaitingReply,
}

/// What the caller must send to the advice service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    pub query: String,
    pub history: Vec<Turn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    /// A request is already outstanding; the submission is dropped, not queued.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Dispatch(AdviceRequest),
    Rejected(Rejection),
}

#[derive(Debug)]
pub struct ConversationController {
    conversation: ConversationState,
    request_state: RequestState,
    input: String,
    fallbacks: FallbackTable,
}

impl ConversationController {
    pub fn new(copy: WidgetCopy) -> Result<Self, EmptyMessage> {
        Ok(Self {
            conversation: ConversationState::new(&copy.greeting)?,
            request_state: RequestState::Idle,
            input: String::new(),
            fallbacks: copy.fallbacks,
        })
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    pub fn is_busy(&self) -> bool {
        self.request_state == RequestState::AwaitingReply
    }

    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    /// Submit the input buffer. Send button and Enter key both land here.
    pub fn submit(&mut self) -> Submission {
        if self.is_busy() {
            debug!("Dropping submission while a reply is outstanding");
            return Submission::Rejected(Rejection::Busy);
        }

        let query = self.input.trim().to_string();
        let Ok(message) = Message::user(self.input.as_str()) else {
            return Submission::Rejected(Rejection::EmptyInput);
        };

        let history = self.conversation.messages().iter().map(Turn::from).collect();
        self.conversation.append(message);
        self.input.clear();
        self.request_state = RequestState::AwaitingReply;

        Submission::Dispatch(AdviceRequest { query, history })
    }

    /// Fold the advice outcome back in. Every fault becomes an ordinary
    /// assistant message and the controller always returns to `Idle`.
    ///
    /// Returns `None` when no request is outstanding.
    pub fn resolve(&mut self, outcome: Result<String, AdviceFault>) -> Option<&Message> {
        if !self.is_busy() {
            warn!("Ignoring advice outcome with no request outstanding");
            return None;
        }

        let reply = match outcome {
            Ok(text) => Message::assistant(text).map_err(|_| AdviceFault::EmptyReply),
            Err(fault) => Err(fault),
        };

        let message = match reply {
            Ok(message) => message,
            Err(fault) => {
                warn!("Advice request faulted: {}", fault);
                self.fallback_message(&fault)
            }
        };

        self.request_state = RequestState::Idle;
        Some(self.conversation.append(message))
    }

    fn fallback_message(&self, fault: &AdviceFault) -> Message {
        let text = self.fallbacks.message_for(fault.kind());
        Message::assistant(text).unwrap_or_else(|_| Message::fallback(fault.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{FaultKind, WidgetVariant};
    use crate::chat::conversation_state::Role;

    const CONTACT: &str = "genxoverseasindia1@gmail.com";

    fn controller() -> ConversationController {
        ConversationController::new(WidgetCopy::new(WidgetVariant::Desk, CONTACT)).unwrap()
    }

    fn submit(controller: &mut ConversationController, text: &str) -> Submission {
        controller.set_input(text);
        controller.submit()
    }

    #[test]
    fn test_fresh_controller_is_seeded_and_idle() {
        let controller = controller();
        assert_eq!(controller.request_state(), RequestState::Idle);
        assert_eq!(controller.conversation().len(), 1);
        assert_eq!(controller.conversation().messages()[0].role(), Role::Assistant);
    }

    #[test]
    fn test_blank_input_never_leaves_idle() {
        let mut controller = controller();
        for blank in ["", "   ", "\t\n"] {
            assert_eq!(
                submit(&mut controller, blank),
                Submission::Rejected(Rejection::EmptyInput)
            );
            assert_eq!(controller.request_state(), RequestState::Idle);
        }
        assert_eq!(controller.conversation().len(), 1);
    }

    #[test]
    fn test_submit_appends_user_message_and_dispatches_trimmed_query() {
        let mut controller = controller();
        let submission = submit(&mut controller, "  Turmeric price?  ");

        let Submission::Dispatch(request) = submission else {
            panic!("expected dispatch, got {submission:?}");
        };
        assert_eq!(request.query, "Turmeric price?");
        assert_eq!(request.history.len(), 1);
        assert_eq!(request.history[0].role, Role::Assistant);

        assert!(controller.is_busy());
        assert!(controller.input().is_empty());
        let latest = controller.conversation().latest().unwrap();
        assert_eq!(latest.role(), Role::User);
    }

    #[test]
    fn test_second_submit_while_awaiting_is_dropped() {
        let mut controller = controller();
        assert!(matches!(submit(&mut controller, "first"), Submission::Dispatch(_)));
        assert_eq!(
            submit(&mut controller, "second"),
            Submission::Rejected(Rejection::Busy)
        );
        assert_eq!(controller.conversation().len(), 2);
        // The dropped text stays in the buffer for the user to resend.
        assert_eq!(controller.input(), "second");
    }

    #[test]
    fn test_every_fault_appends_one_fallback_and_returns_to_idle() {
        let faults = [
            AdviceFault::ConfigMissing,
            AdviceFault::AuthRejected { status: 403 },
            AdviceFault::RateLimited,
            AdviceFault::EmptyReply,
            AdviceFault::Transport("connection reset".to_string()),
        ];
        let table = WidgetCopy::new(WidgetVariant::Desk, CONTACT).fallbacks;

        for fault in faults {
            let mut controller = controller();
            submit(&mut controller, "Onion export?");
            let kind = fault.kind();
            let appended = controller.resolve(Err(fault)).unwrap().clone();

            assert_eq!(appended.role(), Role::Assistant);
            assert_eq!(appended.text(), table.message_for(kind));
            assert_eq!(controller.conversation().len(), 3);
            assert_eq!(controller.request_state(), RequestState::Idle);
        }
    }

    #[test]
    fn test_blank_reply_is_treated_as_empty_reply() {
        let mut controller = controller();
        submit(&mut controller, "Saffron grades?");
        let appended = controller.resolve(Ok("   ".to_string())).unwrap().clone();
        let table = WidgetCopy::new(WidgetVariant::Desk, CONTACT).fallbacks;
        assert_eq!(appended.text(), table.message_for(FaultKind::EmptyReply));
    }

    #[test]
    fn test_resolve_without_outstanding_request_is_ignored() {
        let mut controller = controller();
        assert!(controller.resolve(Ok("stray".to_string())).is_none());
        assert_eq!(controller.conversation().len(), 1);
    }

    #[test]
    fn test_round_trips_alternate_after_seed() {
        let mut controller = controller();
        let n = 4;
        for i in 0..n {
            submit(&mut controller, &format!("question {i}"));
            controller.resolve(Ok(format!("answer {i}")));
        }

        let messages = controller.conversation().messages();
        assert_eq!(messages.len(), 1 + 2 * n);
        for (i, message) in messages.iter().enumerate().skip(1) {
            let expected = if i % 2 == 1 { Role::User } else { Role::Assistant };
            assert_eq!(message.role(), expected);
        }
    }
}
