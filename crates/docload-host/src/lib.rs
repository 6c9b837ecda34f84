//! docload host capabilities
//!
//! The traits a host environment implements so its resource constructors can
//! be wrapped by the docload proxies:
//! - [`Constructor`]: anything that produces fresh instances
//! - [`EventTarget`]: completion notifications (listeners and `on*` slots)
//! - [`Request`]: a network request with `open`/`send`
//! - [`MediaElement`]: an element whose `src` locator drives loading
//!
//! [`EventDispatch`] is a ready-made multi-subscriber registry host
//! implementations can embed.
//!
//! # Example
//!
//! ```rust,ignore
//! use docload_host::{from_fn, Constructor};
//!
//! let ctor = from_fn(|| Ok(MyRequest::default()));
//! let request = ctor.construct()?;
//! request.open("GET", "http://example.com/page.html")?;
//! request.send(None)?;
//! ```

#![warn(unreachable_pub)]

pub mod constructor;
pub mod error;
pub mod event;
pub mod media;
pub mod request;

pub use constructor::{from_fn, Constructor, FnConstructor};
pub use error::HostError;
pub use event::{EventDispatch, EventKind, EventTarget, Listener};
pub use media::{is_src_attribute, MediaElement, SRC_ATTRIBUTE};
pub use request::{ReadyState, Request};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
