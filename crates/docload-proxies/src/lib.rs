//! docload proxies - deterministic resource loading
//!
//! Two constructor decorators for hosted document rendering:
//! - [`CompletionTrackingProxy`]: tracks every produced request and reports
//!   when all of them have finished
//! - [`BaseUrlRequestProxy`] / [`BaseUrlMediaProxy`]: resolve relative
//!   locators against a base location while callers keep seeing the value
//!   they assigned
//!
//! Both are themselves [`Constructor`]s, so they layer:
//!
//! ```rust,ignore
//! use docload_proxies::{BaseUrlRequestProxy, CompletionTrackingProxy};
//!
//! let requests = CompletionTrackingProxy::new(
//!     BaseUrlRequestProxy::new(host_requests, "http://localhost/fixtures/")?,
//! );
//!
//! let xhr = requests.construct()?;
//! xhr.open("GET", "test.html")?;
//! xhr.send(None)?;
//!
//! let finished = requests.wait_for_requests_to_finish().await?;
//! assert_eq!(finished.total_count, 1);
//! ```

#![warn(unreachable_pub)]

pub mod base_url;
pub mod config;
pub mod error;
pub mod tracker;

pub use base_url::{
    BaseLocation, BaseUrlMedia, BaseUrlMediaProxy, BaseUrlRequest, BaseUrlRequestProxy,
    JoinResolver, UrlResolver,
};
pub use config::{CountMode, ProxyConfig, TrackerConfig};
pub use error::ProxyError;
pub use tracker::{CompletionTrackingProxy, FinishedRequests, Tracked, WaitForRequests};

pub use docload_host::Constructor;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with docload proxies
    pub use crate::{
        BaseUrlMediaProxy, BaseUrlRequestProxy, CompletionTrackingProxy, FinishedRequests,
        ProxyConfig,
    };
    pub use docload_host::{Constructor, EventKind, EventTarget, MediaElement, Request};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
