//! Errors raised while running a single analysis step.

use crate::models::AnalysisStep;
use thiserror::Error;

/// Why a step invocation failed.
///
/// Every variant ends up in the session's single error slot as
/// `"Error in <step>: <message>"`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("Please enter a brand name")]
    MissingBrandName,

    #[error("API URL is not configured (set {env_var})")]
    NotConfigured { env_var: &'static str },

    #[error("request already in flight")]
    AlreadyRunning,

    #[error("{0}")]
    Transport(String),

    /// Non-2xx response; `message` is the backend's `detail` or a synthesized status line.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("invalid JSON response: {0}")]
    Decode(String),
}

impl StepError {
    /// Synthesized message for a failure body without a usable `detail`.
    pub fn status_fallback(status: u16, reason: &str) -> Self {
        let message = if reason.is_empty() {
            format!("Request failed with status {}", status)
        } else {
            format!("Request failed with status {} {}", status, reason)
        };
        StepError::Server { status, message }
    }

    /// Text shown in the error slot.
    pub fn slot_message(&self, step: AnalysisStep) -> String {
        format!("Error in {}: {}", step, self)
    }
}
