use async_trait::async_trait;
use eyre::Result;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Config, EmailJsConfig};

/// Template fields of one quote enquiry email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotePayload {
    pub product_name: String,
    pub from_name: String,
    pub from_email: String,
    pub quantity: String,
    pub message: String,
    pub to_email: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("email service rejected the enquiry (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("email service unreachable: {0}")]
    Transport(String),
}

#[async_trait]
pub trait EmailDelivery: Send + Sync {
    async fn send(&self, payload: &QuotePayload) -> Result<(), DeliveryError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a QuotePayload,
}

/// EmailJS REST client.
pub struct EmailJsClient {
    endpoint: String,
    settings: EmailJsConfig,
    client: reqwest::Client,
}

impl EmailJsClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let endpoint = format!(
            "{}/api/v1.0/email/send",
            config.email.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            endpoint,
            settings: config.email.clone(),
            client,
        })
    }
}

#[async_trait]
impl EmailDelivery for EmailJsClient {
    async fn send(&self, payload: &QuotePayload) -> Result<(), DeliveryError> {
        let body = SendRequest {
            service_id: &self.settings.service_id,
            template_id: &self.settings.template_id,
            user_id: &self.settings.public_key,
            template_params: payload,
        };
        debug!("Sending quote enquiry for {}", payload.product_name);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Email service unreachable: {}", e);
                DeliveryError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Email service returned {}: {}", status, body);
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("Quote enquiry delivered");
        Ok(())
    }
}
