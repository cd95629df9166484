//! Custom error types for the guardian

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GuardianError {
    #[error("Venue feed unavailable: {message}")]
    FeedUnavailable {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("Advisory service unavailable: {message}")]
    AdvisoryUnavailable {
        message: String,
    },

    #[error("Execution failed: {reason}")]
    ExecutionFailure {
        reason: String,
    },

    #[error("Ledger interaction failed: {message}")]
    Ledger {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
    },
}

impl GuardianError {
    pub fn config(message: impl Into<String>) -> Self {
        GuardianError::Configuration { message: message.into() }
    }

    pub fn feed(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        GuardianError::FeedUnavailable { message: message.into(), source }
    }

    /// Stable label used for error counters and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GuardianError::FeedUnavailable { .. } => "feed_unavailable",
            GuardianError::AdvisoryUnavailable { .. } => "advisory_unavailable",
            GuardianError::ExecutionFailure { .. } => "execution_failure",
            GuardianError::Ledger { .. } => "ledger",
            GuardianError::Configuration { .. } => "configuration",
        }
    }
}

pub type GuardianResult<T> = Result<T, GuardianError>;
