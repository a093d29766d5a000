//! HTTP transport shared by every WebDAV library.
//!
//! Wraps a single reqwest client with relaxed TLS verification, a
//! host-keyed cookie jar, Basic/Digest challenge handling backed by a
//! per-origin cache, and request rewriting.

pub mod authenticator;
pub mod client;
pub mod cookies;
pub mod registry;

pub use client::{HttpTransport, TransportRequest};
pub use cookies::{Cookie, HostCookieJar};
pub use registry::SessionRegistry;
