//! Completion notifications
//!
//! Hosts signal the end of a load through [`EventKind`] notifications. A
//! target may support any number of listeners (`add_event_listener`) and
//! always carries one handler slot per kind (`onload`, `onerror`, `onabort`).

use crate::error::HostError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Callback invoked with the notification that fired
pub type Listener = Arc<dyn Fn(EventKind) + Send + Sync>;

/// Terminal load notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The load finished (any transport-level response)
    Load,
    /// The load failed before a response arrived
    Error,
    /// The load was aborted by the caller
    Abort,
}

impl EventKind {
    /// Every kind that ends a load
    pub const TERMINAL: [EventKind; 3] = [EventKind::Load, EventKind::Error, EventKind::Abort];

    /// Slot index of this kind
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Load => 0,
            Self::Error => 1,
            Self::Abort => 2,
        }
    }

    /// Name of the matching handler property
    #[must_use]
    pub const fn handler_name(self) -> &'static str {
        match self {
            Self::Load => "onload",
            Self::Error => "onerror",
            Self::Abort => "onabort",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Error => f.write_str("error"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// An instance that emits completion notifications
pub trait EventTarget: Send + Sync {
    /// Register an additional listener for `kind`
    ///
    /// # Errors
    /// - `HostError::Unsupported` if the host only offers handler slots
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        let _ = (kind, listener);
        Err(HostError::Unsupported("addEventListener"))
    }

    /// Replace the single handler for `kind`
    fn set_handler(&self, kind: EventKind, handler: Option<Listener>);

    /// Current handler for `kind`
    fn handler(&self, kind: EventKind) -> Option<Listener>;
}

/// Multi-subscriber registry with one handler slot per [`EventKind`]
///
/// Dispatch calls listeners in registration order, then the handler. The
/// callbacks are snapshotted first and invoked without holding the lock, so
/// they may freely call back into the owning target.
#[derive(Default)]
pub struct EventDispatch {
    listeners: Mutex<Vec<(EventKind, Listener)>>,
    handlers: Mutex<[Option<Listener>; 3]>,
}

impl EventDispatch {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener for `kind`
    pub fn add_listener(&self, kind: EventKind, listener: Listener) {
        self.listeners.lock().push((kind, listener));
    }

    /// Replace the handler for `kind`
    pub fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        self.handlers.lock()[kind.index()] = handler;
    }

    /// Current handler for `kind`
    #[must_use]
    pub fn handler(&self, kind: EventKind) -> Option<Listener> {
        self.handlers.lock()[kind.index()].clone()
    }

    /// Number of listeners registered for `kind`
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .count()
    }

    /// Notify every listener and the handler for `kind`
    pub fn dispatch(&self, kind: EventKind) {
        let mut callbacks: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(registered, _)| *registered == kind)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        if let Some(handler) = self.handler(kind) {
            callbacks.push(handler);
        }

        tracing::trace!("Dispatching {} to {} callbacks", kind, callbacks.len());
        for callback in callbacks {
            callback(kind);
        }
    }
}

impl fmt::Debug for EventDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock();
        f.debug_struct("EventDispatch")
            .field("listeners", &self.listeners.lock().len())
            .field(
                "handlers",
                &EventKind::TERMINAL
                    .iter()
                    .filter(|kind| handlers[kind.index()].is_some())
                    .map(|kind| kind.handler_name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
