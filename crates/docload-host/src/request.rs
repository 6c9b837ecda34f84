//! Network request capability

use crate::error::HostError;
use crate::event::EventTarget;

/// Lifecycle of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// Created, `open` not yet called
    #[default]
    Unsent,
    /// `open` called, not yet sent
    Opened,
    /// Sent, waiting for the response
    Loading,
    /// Finished (successfully, with an error, or aborted)
    Done,
}

/// A network request in the style of a host `XMLHttpRequest`
pub trait Request: EventTarget {
    /// Prepare a request for `method` against `url`
    ///
    /// # Errors
    /// - `HostError::InvalidUrl` if the host cannot use the locator
    fn open(&self, method: &str, url: &str) -> Result<(), HostError>;

    /// Start the transfer
    ///
    /// # Errors
    /// - `HostError::InvalidState` if the request was not opened
    fn send(&self, body: Option<Vec<u8>>) -> Result<(), HostError>;

    /// Cancel an in-flight transfer
    fn abort(&self);

    /// Current lifecycle state
    fn ready_state(&self) -> ReadyState;

    /// Response status, once known
    fn status(&self) -> Option<u16>;

    /// Response body decoded as text, once loaded
    fn response_text(&self) -> Option<String>;
}
