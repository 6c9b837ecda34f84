//! Error types for docload proxies
//!
//! Proxies never originate load failures. The only errors of their own are
//! configuration problems detected while building a proxy, and a completion
//! query whose tracker vanished before it could answer.

use docload_host::HostError;

/// Main proxy error type
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The configured base location is not an absolute URL
    #[error("invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        /// Base location as configured
        url: String,
        /// Parser diagnostic
        #[source]
        source: url::ParseError,
    },

    /// The tracker was dropped while the query was still waiting
    #[error("request tracker dropped with {pending} request(s) still pending")]
    Abandoned {
        /// Requests outstanding when the waiter was queued
        pending: usize,
    },

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the wrapped host constructor or instance
    #[error("host error: {0}")]
    Host(#[from] HostError),
}

impl ProxyError {
    /// Check if the error comes from configuration rather than loading
    #[inline]
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::InvalidBaseUrl { .. } | Self::Config(_) | Self::Io(_)
        )
    }
}

impl From<toml::de::Error> for ProxyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
