//! Two-step quote intake wizard.
//!
//! `Requirements -> Contact -> Submitting -> Submitted`, with a failed
//! delivery returning to `Contact` with an error and all fields intact.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use super::email::{DeliveryError, QuotePayload};
use crate::catalog::{self, GENERAL_INQUIRY};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteRequest {
    pub full_name: String,
    pub email: String,
    /// A catalog id or [`GENERAL_INQUIRY`]; empty until the form is opened.
    pub product_id: String,
    pub quantity: String,
    pub requirements: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStep {
    Requirements,
    Contact,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteField {
    InquiryTarget,
    Quantity,
    Requirements,
    FullName,
    Email,
}

impl fmt::Display for QuoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuoteField::InquiryTarget => "inquiry type",
            QuoteField::Quantity => "quantity",
            QuoteField::Requirements => "requirements",
            QuoteField::FullName => "full name",
            QuoteField::Email => "email",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("{0} is required")]
    MissingField(QuoteField),

    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),

    #[error("unknown product {0:?}")]
    UnknownProduct(String),

    #[error("cannot {action} during the {step:?} step")]
    WrongStep {
        action: &'static str,
        step: QuoteStep,
    },
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn require(value: &str, field: QuoteField) -> Result<(), QuoteError> {
    if value.trim().is_empty() {
        return Err(QuoteError::MissingField(field));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct QuoteForm {
    request: QuoteRequest,
    step: QuoteStep,
    error: Option<String>,
    contact: String,
}

impl QuoteForm {
    /// `contact` receives the enquiries and is named in the failure message.
    pub fn new(contact: impl Into<String>) -> Self {
        Self {
            request: QuoteRequest::default(),
            step: QuoteStep::Requirements,
            error: None,
            contact: contact.into(),
        }
    }

    /// Preselect the inquiry target, as when the form opens from a product card.
    pub fn open(&mut self, selected_product: Option<&str>) {
        self.request.product_id = selected_product
            .filter(|id| catalog::find(id).is_some())
            .unwrap_or(GENERAL_INQUIRY)
            .to_string();
    }

    pub fn request(&self) -> &QuoteRequest {
        &self.request
    }

    pub fn step(&self) -> QuoteStep {
        self.step
    }

    pub fn is_sending(&self) -> bool {
        self.step == QuoteStep::Submitting
    }

    pub fn is_submitted(&self) -> bool {
        self.step == QuoteStep::Submitted
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Mutable access to the fields while the form is editable.
    pub fn edit(&mut self) -> Result<&mut QuoteRequest, QuoteError> {
        match self.step {
            QuoteStep::Requirements | QuoteStep::Contact => Ok(&mut self.request),
            step => Err(QuoteError::WrongStep { action: "edit", step }),
        }
    }

    pub fn select_product(&mut self, product_id: &str) -> Result<(), QuoteError> {
        if product_id != GENERAL_INQUIRY && catalog::find(product_id).is_none() {
            return Err(QuoteError::UnknownProduct(product_id.to_string()));
        }
        self.edit()?.product_id = product_id.to_string();
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), QuoteError> {
        if self.step != QuoteStep::Requirements {
            return Err(QuoteError::WrongStep {
                action: "continue",
                step: self.step,
            });
        }

        require(&self.request.product_id, QuoteField::InquiryTarget)?;
        require(&self.request.quantity, QuoteField::Quantity)?;
        require(&self.request.requirements, QuoteField::Requirements)?;

        self.step = QuoteStep::Contact;
        Ok(())
    }

    pub fn back(&mut self) -> Result<(), QuoteError> {
        if self.step != QuoteStep::Contact {
            return Err(QuoteError::WrongStep {
                action: "go back",
                step: self.step,
            });
        }
        self.step = QuoteStep::Requirements;
        Ok(())
    }

    /// Validate contact details and move to `Submitting`, returning what to send.
    pub fn begin_submit(&mut self) -> Result<QuotePayload, QuoteError> {
        if self.step != QuoteStep::Contact {
            return Err(QuoteError::WrongStep {
                action: "submit",
                step: self.step,
            });
        }

        require(&self.request.full_name, QuoteField::FullName)?;
        require(&self.request.email, QuoteField::Email)?;
        let email = self.request.email.trim();
        if !email_pattern().is_some_and(|pattern| pattern.is_match(email)) {
            return Err(QuoteError::InvalidEmail(email.to_string()));
        }

        let quantity = self.request.quantity.trim();
        let payload = QuotePayload {
            product_name: catalog::inquiry_name(&self.request.product_id).to_string(),
            from_name: self.request.full_name.trim().to_string(),
            from_email: email.to_string(),
            quantity: if quantity.is_empty() { "N/A" } else { quantity }.to_string(),
            message: self.request.requirements.clone(),
            to_email: self.contact.clone(),
        };

        self.error = None;
        self.step = QuoteStep::Submitting;
        debug!("Quote enquiry submitting for {}", payload.product_name);
        Ok(payload)
    }

    /// Fold the delivery outcome back in.
    pub fn complete(&mut self, outcome: Result<(), DeliveryError>) -> Result<(), QuoteError> {
        if self.step != QuoteStep::Submitting {
            return Err(QuoteError::WrongStep {
                action: "complete",
                step: self.step,
            });
        }

        match outcome {
            Ok(()) => self.step = QuoteStep::Submitted,
            Err(err) => {
                warn!("Quote enquiry delivery failed: {}", err);
                self.error = Some(format!(
                    "Failed to send enquiry. Please try again or email us directly at {}",
                    self.contact
                ));
                self.step = QuoteStep::Contact;
            }
        }
        Ok(())
    }

    /// Clear every field and flag, ready for the next opening.
    pub fn reset(&mut self) {
        self.request = QuoteRequest::default();
        self.step = QuoteStep::Requirements;
        self.error = None;
    }
}
