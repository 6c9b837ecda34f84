//! Instance constructors
//!
//! A [`Constructor`] stands in for the host's `new Type()`. Proxies take a
//! constructor and are constructors themselves, so they layer freely.

use crate::error::HostError;
use std::fmt;
use std::sync::Arc;

/// Produces fresh instances of a host resource type
pub trait Constructor: Send + Sync {
    /// Type of the produced instances
    type Instance;

    /// Create a new instance
    ///
    /// # Errors
    /// Whatever the host raises while creating the instance
    fn construct(&self) -> Result<Self::Instance, HostError>;
}

impl<C: Constructor + ?Sized> Constructor for Arc<C> {
    type Instance = C::Instance;

    fn construct(&self) -> Result<Self::Instance, HostError> {
        (**self).construct()
    }
}

impl<C: Constructor + ?Sized> Constructor for &C {
    type Instance = C::Instance;

    fn construct(&self) -> Result<Self::Instance, HostError> {
        (**self).construct()
    }
}

/// Constructor backed by a closure, see [`from_fn`]
#[derive(Clone)]
pub struct FnConstructor<F> {
    f: F,
}

/// Adapt a closure into a [`Constructor`]
#[inline]
pub fn from_fn<F, T>(f: F) -> FnConstructor<F>
where
    F: Fn() -> Result<T, HostError> + Send + Sync,
{
    FnConstructor { f }
}

impl<F, T> Constructor for FnConstructor<F>
where
    F: Fn() -> Result<T, HostError> + Send + Sync,
{
    type Instance = T;

    fn construct(&self) -> Result<T, HostError> {
        (self.f)()
    }
}

impl<F> fmt::Debug for FnConstructor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConstructor").finish_non_exhaustive()
    }
}
