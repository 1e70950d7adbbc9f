use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ways a single advice request can fail.
///
/// The controller turns every fault into an ordinary assistant message, so
/// none of these ever reach the user as an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdviceFault {
    /// No usable credential; no request was sent.
    #[error("advice credential is not configured")]
    ConfigMissing,

    #[error("advice service rejected the credential (HTTP {status})")]
    AuthRejected { status: u16 },

    #[error("advice service rate limit exceeded")]
    RateLimited,

    #[error("advice service returned an empty reply")]
    EmptyReply,

    #[error("advice service transport fault: {0}")]
    Transport(String),
}

impl AdviceFault {
    pub fn kind(&self) -> FaultKind {
        match self {
            AdviceFault::ConfigMissing => FaultKind::ConfigMissing,
            AdviceFault::AuthRejected { .. } => FaultKind::AuthRejected,
            AdviceFault::RateLimited => FaultKind::RateLimited,
            AdviceFault::EmptyReply => FaultKind::EmptyReply,
            AdviceFault::Transport(_) => FaultKind::Transport,
        }
    }

    /// Classify a non-success HTTP status from the advice service or proxy.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => AdviceFault::AuthRejected { status },
            429 => AdviceFault::RateLimited,
            _ => AdviceFault::Transport(format!("HTTP {status}: {}", body.trim())),
        }
    }
}

impl From<reqwest::Error> for AdviceFault {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AdviceFault::from_status(status.as_u16(), &err.to_string()),
            None => AdviceFault::Transport(err.to_string()),
        }
    }
}

/// Payload-free discriminant, used to key the fallback copy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    ConfigMissing,
    AuthRejected,
    RateLimited,
    EmptyReply,
    Transport,
}

impl FaultKind {
    pub const ALL: [FaultKind; 5] = [
        FaultKind::ConfigMissing,
        FaultKind::AuthRejected,
        FaultKind::RateLimited,
        FaultKind::EmptyReply,
        FaultKind::Transport,
    ];
}
