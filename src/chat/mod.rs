pub mod controller;
pub mod conversation_state;
pub mod widget;

pub use controller::{AdviceRequest, ConversationController, Rejection, RequestState, Submission};
pub use conversation_state::{ConversationState, Message, Role};
pub use widget::{AssistantWidget, ChatView, NullView, SendOutcome};
