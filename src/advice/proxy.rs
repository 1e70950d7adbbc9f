use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use super::fault::AdviceFault;
use super::{AdviceService, Turn};
use crate::config::Config;

/// Body of `POST /api/trade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub query: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

/// Success and failure bodies of `POST /api/trade` share this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeReply {
    #[serde(default)]
    pub reply: String,
}

/// Talks to a deployed trade proxy rather than to the model.
pub struct ProxyAdviceClient {
    endpoint: Url,
    client: reqwest::Client,
}

impl ProxyAdviceClient {
    /// `base` may be the site root or the full `/api/trade` URL.
    pub fn from_config(config: &Config, base: Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let endpoint = if base.path().ends_with("/api/trade") {
            base
        } else {
            let root = format!("{}/", base.as_str().trim_end_matches('/'));
            Url::parse(&root)?.join("api/trade")?
        };

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl AdviceService for ProxyAdviceClient {
    async fn get_advice(&self, query: &str, history: &[Turn]) -> Result<String, AdviceFault> {
        let body = TradeRequest {
            query: query.to_string(),
            history: history.to_vec(),
        };
        debug!("Posting trade inquiry to {}", self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Trade proxy unreachable: {}", e);
                AdviceFault::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Trade proxy returned {}: {}", status, error_text);
            return Err(AdviceFault::from_status(status.as_u16(), &error_text));
        }

        let reply: TradeReply = response
            .json()
            .await
            .map_err(|e| AdviceFault::Transport(e.to_string()))?;

        if reply.reply.trim().is_empty() {
            return Err(AdviceFault::EmptyReply);
        }
        Ok(reply.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ProxyAdviceClient {
        let config = Config::from_lookup(|_| None).unwrap();
        ProxyAdviceClient::from_config(&config, Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_resolution() {
        assert_eq!(
            client_for("https://genx.example").endpoint().as_str(),
            "https://genx.example/api/trade"
        );
        assert_eq!(
            client_for("https://genx.example/site/").endpoint().as_str(),
            "https://genx.example/site/api/trade"
        );
        assert_eq!(
            client_for("http://127.0.0.1:8787/api/trade").endpoint().as_str(),
            "http://127.0.0.1:8787/api/trade"
        );
    }

    #[test]
    fn test_request_accepts_model_role_from_browsers() {
        let request: TradeRequest = serde_json::from_str(
            r#"{"query": "Basmati?", "history": [{"role": "model", "text": "Hello"}]}"#,
        )
        .unwrap();
        assert_eq!(request.history.len(), 1);
        assert_eq!(
            request.history[0].role,
            crate::chat::conversation_state::Role::Assistant
        );
    }
}
