//! HTTP host for docload
//!
//! [`HttpRequestConstructor`] produces [`HttpRequest`]s: `XMLHttpRequest`-like
//! requests performed by `reqwest` on the ambient tokio runtime. Like a
//! request in a document without a base location, they only accept absolute
//! URLs; wrap the constructor in a base-url proxy to load relative ones.

#![warn(unreachable_pub)]

pub mod config;
pub mod request;

pub use config::HttpConfig;
pub use request::{HttpRequest, HttpRequestConstructor};
