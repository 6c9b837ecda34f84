//! Base-url resolution
//!
//! [`BaseUrlRequestProxy`] and [`BaseUrlMediaProxy`] wrap resource
//! constructors so relative locators load against a configured base
//! location. Callers keep seeing exactly what they assigned; only the wrapped
//! instance ever receives the resolved locator.

use crate::error::ProxyError;
use docload_host::{
    is_src_attribute, Constructor, EventKind, EventTarget, HostError, Listener, MediaElement,
    ReadyState, Request,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Combines a base location with a possibly relative locator
///
/// Absolute locators must come back unchanged (up to normalization).
pub trait UrlResolver: Send + Sync {
    /// Resolve `relative` against `base`
    ///
    /// # Errors
    /// - `url::ParseError` if the combination is not a valid URL
    fn resolve(&self, base: &Url, relative: &str) -> Result<String, url::ParseError>;
}

/// Standard URL joining via [`Url::join`]
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinResolver;

impl UrlResolver for JoinResolver {
    fn resolve(&self, base: &Url, relative: &str) -> Result<String, url::ParseError> {
        base.join(relative).map(String::from)
    }
}

/// A parsed base location plus the resolver applied to it
#[derive(Clone)]
pub struct BaseLocation {
    base: Url,
    resolver: Arc<dyn UrlResolver>,
}

impl BaseLocation {
    /// Parse `base_url` and resolve with [`JoinResolver`]
    ///
    /// # Errors
    /// - `ProxyError::InvalidBaseUrl` if `base_url` is not absolute or cannot
    ///   act as a base
    pub fn parse(base_url: &str) -> Result<Self, ProxyError> {
        Self::with_resolver(base_url, Arc::new(JoinResolver))
    }

    /// Parse `base_url` and resolve with a custom resolver
    ///
    /// # Errors
    /// - `ProxyError::InvalidBaseUrl` if `base_url` is not absolute or cannot
    ///   act as a base (`data:`, `mailto:`)
    pub fn with_resolver(
        base_url: &str,
        resolver: Arc<dyn UrlResolver>,
    ) -> Result<Self, ProxyError> {
        let invalid = |source| ProxyError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        };
        let base = Url::parse(base_url).map_err(invalid)?;
        // data:, mailto: and friends parse but nothing can be joined onto them
        if base.cannot_be_a_base() {
            return Err(invalid(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(Self { base, resolver })
    }

    /// Base location
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.base
    }

    /// Locator the wrapped instance should load for `relative`
    ///
    /// Values the resolver rejects pass through untouched so the host reports
    /// the problem exactly as it would without the proxy.
    #[must_use]
    pub fn resolve(&self, relative: &str) -> String {
        match self.resolver.resolve(&self.base, relative) {
            Ok(resolved) => {
                tracing::trace!("Resolved '{}' to '{}'", relative, resolved);
                resolved
            }
            Err(err) => {
                tracing::warn!(
                    "Cannot resolve '{}' against '{}': {}",
                    relative,
                    self.base,
                    err
                );
                relative.to_string()
            }
        }
    }
}

impl fmt::Debug for BaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseLocation")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

/// Request constructor whose `open` resolves against a base location
#[derive(Debug, Clone)]
pub struct BaseUrlRequestProxy<C> {
    ctor: C,
    base: BaseLocation,
}

impl<C> BaseUrlRequestProxy<C> {
    /// Wrap `ctor`, resolving against `base_url`
    ///
    /// # Errors
    /// - `ProxyError::InvalidBaseUrl` if `base_url` is not absolute
    pub fn new(ctor: C, base_url: &str) -> Result<Self, ProxyError> {
        Ok(Self::with_base(ctor, BaseLocation::parse(base_url)?))
    }

    /// Wrap `ctor` with an already parsed base location
    #[inline]
    #[must_use]
    pub fn with_base(ctor: C, base: BaseLocation) -> Self {
        Self { ctor, base }
    }

    /// Base location
    #[inline]
    #[must_use]
    pub fn base(&self) -> &BaseLocation {
        &self.base
    }
}

impl<C> Constructor for BaseUrlRequestProxy<C>
where
    C: Constructor,
    C::Instance: Request,
{
    type Instance = BaseUrlRequest<C::Instance>;

    fn construct(&self) -> Result<Self::Instance, HostError> {
        Ok(BaseUrlRequest {
            inner: self.ctor.construct()?,
            base: self.base.clone(),
        })
    }
}

/// Request produced by [`BaseUrlRequestProxy`]
#[derive(Debug)]
pub struct BaseUrlRequest<R> {
    inner: R,
    base: BaseLocation,
}

impl<R> BaseUrlRequest<R> {
    /// Wrapped request
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: EventTarget> EventTarget for BaseUrlRequest<R> {
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        self.inner.add_event_listener(kind, listener)
    }

    fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        self.inner.set_handler(kind, handler);
    }

    fn handler(&self, kind: EventKind) -> Option<Listener> {
        self.inner.handler(kind)
    }
}

impl<R: Request> Request for BaseUrlRequest<R> {
    fn open(&self, method: &str, url: &str) -> Result<(), HostError> {
        self.inner.open(method, &self.base.resolve(url))
    }

    fn send(&self, body: Option<Vec<u8>>) -> Result<(), HostError> {
        self.inner.send(body)
    }

    fn abort(&self) {
        self.inner.abort();
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.ready_state()
    }

    fn status(&self) -> Option<u16> {
        self.inner.status()
    }

    fn response_text(&self) -> Option<String> {
        self.inner.response_text()
    }
}

/// Media constructor whose `src` resolves against a base location
#[derive(Debug, Clone)]
pub struct BaseUrlMediaProxy<C> {
    ctor: C,
    base: BaseLocation,
}

impl<C> BaseUrlMediaProxy<C> {
    /// Wrap `ctor`, resolving against `base_url`
    ///
    /// # Errors
    /// - `ProxyError::InvalidBaseUrl` if `base_url` is not absolute
    pub fn new(ctor: C, base_url: &str) -> Result<Self, ProxyError> {
        Ok(Self::with_base(ctor, BaseLocation::parse(base_url)?))
    }

    /// Wrap `ctor` with an already parsed base location
    #[inline]
    #[must_use]
    pub fn with_base(ctor: C, base: BaseLocation) -> Self {
        Self { ctor, base }
    }

    /// Base location
    #[inline]
    #[must_use]
    pub fn base(&self) -> &BaseLocation {
        &self.base
    }
}

impl<C> Constructor for BaseUrlMediaProxy<C>
where
    C: Constructor,
    C::Instance: MediaElement,
{
    type Instance = BaseUrlMedia<C::Instance>;

    fn construct(&self) -> Result<Self::Instance, HostError> {
        Ok(BaseUrlMedia {
            inner: self.ctor.construct()?,
            base: self.base.clone(),
            original: Mutex::new(None),
        })
    }
}

/// Media element produced by [`BaseUrlMediaProxy`]
///
/// Both the `src` property and the `src` attribute read back the value the
/// caller assigned: `""` and `None` respectively before any assignment.
#[derive(Debug)]
pub struct BaseUrlMedia<M> {
    inner: M,
    base: BaseLocation,
    original: Mutex<Option<String>>,
}

impl<M> BaseUrlMedia<M> {
    /// Wrapped element
    #[inline]
    #[must_use]
    pub fn get_ref(&self) -> &M {
        &self.inner
    }

    fn remember(&self, value: &str) -> String {
        *self.original.lock() = Some(value.to_string());
        self.base.resolve(value)
    }
}

impl<M: EventTarget> EventTarget for BaseUrlMedia<M> {
    fn add_event_listener(&self, kind: EventKind, listener: Listener) -> Result<(), HostError> {
        self.inner.add_event_listener(kind, listener)
    }

    fn set_handler(&self, kind: EventKind, handler: Option<Listener>) {
        self.inner.set_handler(kind, handler);
    }

    fn handler(&self, kind: EventKind) -> Option<Listener> {
        self.inner.handler(kind)
    }
}

impl<M: MediaElement> MediaElement for BaseUrlMedia<M> {
    fn src(&self) -> String {
        self.original.lock().clone().unwrap_or_default()
    }

    fn set_src(&self, value: &str) {
        let resolved = self.remember(value);
        self.inner.set_src(&resolved);
    }

    fn get_attribute(&self, name: &str) -> Option<String> {
        if is_src_attribute(name) {
            return self.original.lock().clone();
        }
        self.inner.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        if is_src_attribute(name) {
            let resolved = self.remember(value);
            self.inner.set_attribute(name, &resolved);
            return;
        }
        self.inner.set_attribute(name, value);
    }

    fn remove_attribute(&self, name: &str) {
        if is_src_attribute(name) {
            *self.original.lock() = None;
        }
        self.inner.remove_attribute(name);
    }
}
