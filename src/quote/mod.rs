pub mod email;
pub mod form;
pub mod intake;

pub use email::{DeliveryError, EmailDelivery, EmailJsClient, QuotePayload};
pub use form::{QuoteError, QuoteField, QuoteForm, QuoteRequest, QuoteStep};
pub use intake::{IntakeEvent, QuoteIntake, QuoteTimings, SubmitOutcome};
