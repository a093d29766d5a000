//! Session registry: shared authentication and session state.
//!
//! One registry backs one [`HttpTransport`](super::HttpTransport). The
//! process-wide transport owns the production registry; tests build their
//! own so no state leaks between cases.
//!
//! Credentials are resolved by exact host first and otherwise fall back to
//! any registered pair. Most setups talk to a single server, and that server
//! is often reached under a different host after an IP change or redirect.
//! With several libraries on different hosts this can send one library's
//! credentials to another library's server.

use super::authenticator::AuthCache;
use super::cookies::HostCookieJar;
use crate::auth::Credentials;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    credentials: DashMap<String, Credentials>,
    auth_cache: AuthCache,
    cookies: Arc<HostCookieJar>,
    xml_strict: AtomicBool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `user`/`pass` for the host of `url`, replacing any previous
    /// pair for that host, and drop every cached authenticator.
    ///
    /// A malformed URL or one without a host is logged and ignored.
    pub fn register_credentials(&self, url: &str, user: &str, pass: &str) {
        let host = match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_string(),
                None => {
                    warn!("Not registering credentials: {} has no host", url);
                    return;
                }
            },
            Err(e) => {
                warn!("Not registering credentials for malformed URL {}: {}", url, e);
                return;
            }
        };

        debug!("Registering credentials for host {}", host);
        self.credentials.insert(host, Credentials::new(user, pass));
        // Cached nonces and counters were negotiated under the old pair.
        self.auth_cache.clear();
    }

    /// Credentials to answer an authentication request for `host`.
    ///
    /// Exact host match first, then any registered entry. `None` only when
    /// nothing is registered.
    pub fn password_authentication(&self, host: Option<&str>) -> Option<Credentials> {
        if let Some(found) = host.and_then(|h| self.credentials.get(h)) {
            return Some(found.value().clone());
        }
        let fallback = self
            .credentials
            .iter()
            .next()
            .map(|entry| entry.value().clone());
        if fallback.is_some() {
            debug!("No credentials for host {:?}, using fallback entry", host);
        }
        fallback
    }

    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    pub fn cookie_jar(&self) -> Arc<HostCookieJar> {
        Arc::clone(&self.cookies)
    }

    pub(crate) fn auth_cache(&self) -> &AuthCache {
        &self.auth_cache
    }

    /// Set strict PROPFIND parsing for every client on this registry.
    pub fn set_xml_strict(&self, strict: bool) {
        self.xml_strict.store(strict, Ordering::Relaxed);
    }

    pub fn xml_strict(&self) -> bool {
        self.xml_strict.load(Ordering::Relaxed)
    }
}
