//! User-facing strings for the assistant: the seeded greeting and the fixed
//! fallback message for every fault kind.
//!
//! Every fallback names the contact address so a failed request always leaves
//! the user with a manual way forward.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use eyre::{Result, WrapErr};
use tracing::debug;

use super::fault::FaultKind;

/// Which assistant presentation to run. They differ only in copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WidgetVariant {
    /// The full research desk section.
    #[default]
    Desk,
    /// The compact floating assistant.
    Floating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTable {
    messages: HashMap<FaultKind, String>,
}

impl FallbackTable {
    pub fn for_variant(variant: WidgetVariant, contact: &str) -> Self {
        let mut messages = HashMap::new();
        messages.insert(
            FaultKind::ConfigMissing,
            format!(
                "The GenX Trade Intelligence Desk is currently in high-security advisory mode. \
                 For live FOB/CIF pricing and Mandi rate synchronization, please contact our \
                 export team directly at {contact}."
            ),
        );
        messages.insert(
            FaultKind::AuthRejected,
            format!(
                "Our Trade Intelligence gateway is currently undergoing scheduled authentication. \
                 For immediate market pricing, please contact our export desk at {contact}."
            ),
        );
        messages.insert(
            FaultKind::RateLimited,
            format!(
                "The Trade Desk is currently processing a high volume of global inquiries. \
                 Please wait a moment or email {contact} for a priority quote."
            ),
        );
        messages.insert(
            FaultKind::EmptyReply,
            format!(
                "The Mandi data feed returned no answer for this inquiry. Please rephrase your \
                 question or contact our team at {contact} for a manual quote."
            ),
        );

        let transport = match variant {
            WidgetVariant::Desk => format!(
                "We are experiencing a temporary synchronization delay with external market data \
                 feeds. Please contact our team at {contact} and we will provide a comprehensive \
                 manual quote for your destination port."
            ),
            WidgetVariant::Floating => format!(
                "Service currently restricted. Please contact us at {contact} for live support."
            ),
        };
        messages.insert(FaultKind::Transport, transport);

        Self { messages }
    }

    pub fn message_for(&self, kind: FaultKind) -> &str {
        // Every kind is inserted at construction and overrides only replace.
        self.messages.get(&kind).map(String::as_str).unwrap_or_default()
    }

    /// Replace entries from a JSON object keyed by fault kind, e.g.
    /// `{"rate_limited": "..."}`. Blank entries are ignored.
    pub fn apply_overrides(&mut self, overrides: HashMap<FaultKind, String>) {
        for (kind, text) in overrides {
            if text.trim().is_empty() {
                continue;
            }
            debug!("Overriding fallback copy for {:?}", kind);
            self.messages.insert(kind, text);
        }
    }

    pub fn load_overrides(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read fallback copy from {}", path.display()))?;
        let overrides: HashMap<FaultKind, String> = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("Invalid fallback copy in {}", path.display()))?;
        self.apply_overrides(overrides);
        Ok(())
    }
}

/// All strings one assistant instance shows on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCopy {
    pub greeting: String,
    pub fallbacks: FallbackTable,
}

impl WidgetCopy {
    pub fn new(variant: WidgetVariant, contact: &str) -> Self {
        let greeting = match variant {
            WidgetVariant::Desk => {
                "Welcome to the GenX Overseas Trade Intelligence Desk. I am synchronized with \
                 global shipping indices and Indian commodity markets. How can I assist your \
                 supply chain research today?"
            }
            WidgetVariant::Floating => {
                "Hello! I'm the GenX Trade Assistant. How can I help you with Indian export \
                 research or market pricing today?"
            }
        };

        Self {
            greeting: greeting.to_string(),
            fallbacks: FallbackTable::for_variant(variant, contact),
        }
    }
}
