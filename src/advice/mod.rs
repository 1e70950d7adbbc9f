pub mod copy;
pub mod fault;
pub mod framing;
pub mod gemini_client;
pub mod proxy;

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chat::conversation_state::{Message, Role};
use crate::config::Config;

pub use copy::{FallbackTable, WidgetCopy, WidgetVariant};
pub use fault::{AdviceFault, FaultKind};
pub use gemini_client::GeminiAdviceClient;
pub use proxy::ProxyAdviceClient;

/// A role-tagged turn as it travels to the advice service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl From<&Message> for Turn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role(),
            text: message.text().to_string(),
        }
    }
}

/// The external advice service.
///
/// Implementations make exactly one attempt per call and report failure as an
/// [`AdviceFault`]; they never retry and never cache.
#[async_trait]
pub trait AdviceService: Send + Sync {
    /// `query` is the trimmed user input; `history` is every turn before it.
    async fn get_advice(&self, query: &str, history: &[Turn]) -> Result<String, AdviceFault>;
}

/// Build the advice client once for the process. A configured proxy URL
/// takes precedence over calling the model directly.
pub fn build_service(config: &Config) -> Result<Arc<dyn AdviceService>> {
    match &config.proxy_url {
        Some(url) => {
            info!("Using trade proxy at {}", url);
            Ok(Arc::new(ProxyAdviceClient::from_config(config, url.clone())?))
        }
        None => {
            info!("Using advice model {}", config.model);
            Ok(Arc::new(GeminiAdviceClient::from_config(config)?))
        }
    }
}
