use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::email::EmailDelivery;
use super::form::{QuoteError, QuoteForm};

/// Delays after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteTimings {
    /// How long the confirmation stays up before the form closes.
    pub close_after: Duration,
    /// Gap between closing and clearing the fields.
    pub reset_after: Duration,
}

impl Default for QuoteTimings {
    fn default() -> Self {
        Self {
            close_after: Duration::from_secs(5),
            reset_after: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeEvent {
    Submitted,
    Closed,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered,
    /// Delivery failed; the form is back on the contact step showing this message.
    Failed(String),
}

/// Drives a [`QuoteForm`] against an email delivery service.
pub struct QuoteIntake {
    form: Arc<Mutex<QuoteForm>>,
    delivery: Arc<dyn EmailDelivery>,
    timings: QuoteTimings,
    events: mpsc::UnboundedSender<IntakeEvent>,
}

impl QuoteIntake {
    pub fn new(
        form: QuoteForm,
        delivery: Arc<dyn EmailDelivery>,
        timings: QuoteTimings,
    ) -> (Self, mpsc::UnboundedReceiver<IntakeEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let intake = Self {
            form: Arc::new(Mutex::new(form)),
            delivery,
            timings,
            events,
        };
        (intake, receiver)
    }

    /// Lock the form for reading or editing. Do not hold across an await.
    pub fn form(&self) -> MutexGuard<'_, QuoteForm> {
        lock(&self.form)
    }

    /// Submit the contact step. On success the close and reset follow on a
    /// background task whose handle is returned.
    pub async fn submit(&self) -> Result<(SubmitOutcome, Option<JoinHandle<()>>), QuoteError> {
        let payload = self.form().begin_submit()?;

        let outcome = self.delivery.send(&payload).await;
        let delivered = outcome.is_ok();

        let mut form = self.form();
        form.complete(outcome)?;
        if !delivered {
            let message = form.error().unwrap_or_default().to_string();
            return Ok((SubmitOutcome::Failed(message), None));
        }
        drop(form);

        info!("Quote enquiry submitted");
        emit(&self.events, IntakeEvent::Submitted);
        Ok((SubmitOutcome::Delivered, Some(self.schedule_reset())))
    }

    fn schedule_reset(&self) -> JoinHandle<()> {
        let form = Arc::clone(&self.form);
        let events = self.events.clone();
        let timings = self.timings;

        tokio::spawn(async move {
            tokio::time::sleep(timings.close_after).await;
            emit(&events, IntakeEvent::Closed);

            tokio::time::sleep(timings.reset_after).await;
            lock(&form).reset();
            debug!("Quote form reset");
            emit(&events, IntakeEvent::Reset);
        })
    }
}

fn emit(events: &mpsc::UnboundedSender<IntakeEvent>, event: IntakeEvent) {
    if events.send(event).is_err() {
        debug!("No listener for {:?}", event);
    }
}

fn lock(form: &Mutex<QuoteForm>) -> MutexGuard<'_, QuoteForm> {
    form.lock().unwrap_or_else(PoisonError::into_inner)
}
