//! Mock implementations for testing
//!
//! These mocks stand in for the advice and email services so the chat and
//! quote flows can be exercised without network I/O.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::advice::{AdviceFault, AdviceService, Turn};
use crate::chat::controller::AdviceRequest;
use crate::quote::email::{DeliveryError, EmailDelivery, QuotePayload};

// ============================================================================
// Mock advice service
// ============================================================================

/// Advice service that returns queued outcomes and records every call.
pub struct MockAdviceService {
    responses: Mutex<VecDeque<Result<String, AdviceFault>>>,
    calls: Mutex<Vec<AdviceRequest>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockAdviceService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
        }
    }

    pub fn queue_reply(&self, reply: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn queue_fault(&self, fault: AdviceFault) {
        self.responses.lock().unwrap().push_back(Err(fault));
    }

    /// Hold every reply until the returned gate is notified once per call.
    pub fn hold_replies(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn recorded_calls(&self) -> Vec<AdviceRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until at least `count` calls have been made.
    pub async fn wait_for_calls(&self, count: usize) {
        while self.calls.lock().unwrap().len() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

impl Default for MockAdviceService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdviceService for MockAdviceService {
    async fn get_advice(&self, query: &str, history: &[Turn]) -> Result<String, AdviceFault> {
        self.calls.lock().unwrap().push(AdviceRequest {
            query: query.to_string(),
            history: history.to_vec(),
        });

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AdviceFault::Transport("No mock response queued".to_string())))
    }
}

// ============================================================================
// Mock email delivery
// ============================================================================

/// Email delivery that returns queued outcomes and records every payload.
pub struct MockEmailDelivery {
    outcomes: Mutex<VecDeque<Result<(), DeliveryError>>>,
    sent: Mutex<Vec<QuotePayload>>,
}

impl MockEmailDelivery {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_success(&self) {
        self.outcomes.lock().unwrap().push_back(Ok(()));
    }

    pub fn queue_failure(&self, error: DeliveryError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    pub fn sent(&self) -> Vec<QuotePayload> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockEmailDelivery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailDelivery for MockEmailDelivery {
    async fn send(&self, payload: &QuotePayload) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(payload.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
