use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::controller::{ConversationController, RequestState, Rejection, Submission};
use super::conversation_state::{EmptyMessage, Message};
use crate::advice::{AdviceFault, AdviceService, FaultKind, WidgetCopy};

/// Renders the conversation. `message_appended` fires for every append and
/// must bring the newest message into view.
pub trait ChatView: Send + Sync {
    fn message_appended(&self, message: &Message);

    fn busy_changed(&self, _busy: bool) {}
}

/// A view that renders nothing.
pub struct NullView;

impl ChatView for NullView {
    fn message_appended(&self, _message: &Message) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    FellBack(FaultKind),
    Rejected(Rejection),
}

/// One assistant instance: owns its conversation, shares the advice client.
///
/// The controller lock is only held for state transitions, never across the
/// advice call, so a `send` racing an outstanding one sees `AwaitingReply` and
/// is dropped.
pub struct AssistantWidget {
    controller: Mutex<ConversationController>,
    advice: Arc<dyn AdviceService>,
    view: Arc<dyn ChatView>,
}

impl AssistantWidget {
    pub fn new(
        copy: WidgetCopy,
        advice: Arc<dyn AdviceService>,
        view: Arc<dyn ChatView>,
    ) -> Result<Self, EmptyMessage> {
        let controller = ConversationController::new(copy)?;
        if let Some(greeting) = controller.conversation().latest() {
            view.message_appended(greeting);
        }

        Ok(Self {
            controller: Mutex::new(controller),
            advice,
            view,
        })
    }

    fn lock(&self) -> MutexGuard<'_, ConversationController> {
        self.controller.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_state(&self) -> RequestState {
        self.lock().request_state()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().conversation().messages().to_vec()
    }

    /// Run one round trip for `input`.
    pub async fn send(&self, input: &str) -> SendOutcome {
        let (request, user_message) = {
            let mut controller = self.lock();
            controller.set_input(input);
            match controller.submit() {
                Submission::Dispatch(request) => {
                    let appended = controller.conversation().latest().cloned();
                    (request, appended)
                }
                Submission::Rejected(reason) => {
                    debug!("Submission rejected: {:?}", reason);
                    return SendOutcome::Rejected(reason);
                }
            }
        };

        if let Some(message) = &user_message {
            self.view.message_appended(message);
        }
        self.view.busy_changed(true);

        let pending = PendingReply {
            widget: self,
            armed: true,
        };

        info!("Requesting trade advice ({} prior turns)", request.history.len());
        let outcome = self.advice.get_advice(&request.query, &request.history).await;
        let result = match &outcome {
            Ok(text) if !text.trim().is_empty() => SendOutcome::Replied,
            Ok(_) => SendOutcome::FellBack(FaultKind::EmptyReply),
            Err(fault) => SendOutcome::FellBack(fault.kind()),
        };

        pending.disarm();
        self.finish(outcome);

        result
    }

    fn finish(&self, outcome: Result<String, AdviceFault>) {
        let reply = self.lock().resolve(outcome).cloned();
        self.view.busy_changed(false);
        if let Some(message) = &reply {
            self.view.message_appended(message);
        }
    }
}

/// Resolves an outstanding request if `send` is dropped before the advice
/// call returns, so the widget never stays in `AwaitingReply`.
struct PendingReply<'a> {
    widget: &'a AssistantWidget,
    armed: bool,
}

impl PendingReply<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Advice request cancelled before a reply arrived");
        self.widget
            .finish(Err(AdviceFault::Transport("request cancelled".to_string())));
    }
}
