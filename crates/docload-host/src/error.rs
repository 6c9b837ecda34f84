//! Error types raised by host resource implementations

/// Failures a host constructor or instance can report
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host does not offer this capability
    #[error("unsupported capability: {0}")]
    Unsupported(&'static str),

    /// The operation is not valid in the instance's current state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The locator could not be used by the host
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl {
        /// Locator as given by the caller
        url: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The underlying transport failed to start
    #[error("transport error: {0}")]
    Transport(String),
}

impl HostError {
    /// Check if the error marks a missing capability rather than a failure
    #[inline]
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Create an invalid-state error
    #[inline]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}
