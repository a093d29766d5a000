//! Host-keyed cookie jar.
//!
//! Cookies are tracked per host only, not per path or domain scope. Every
//! response that carries `Set-Cookie` replaces the host's whole snapshot.

use dashmap::DashMap;
use reqwest::Url;
use reqwest::header::HeaderValue;

/// A cookie as received from a server, reduced to what is replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the `name=value` pair of a `Set-Cookie` header. Attributes are
    /// dropped; the value is kept as sent, quotes included.
    pub fn parse(set_cookie: &str) -> Option<Self> {
        let pair = set_cookie.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

#[derive(Debug, Default)]
pub struct HostCookieJar {
    cookies: DashMap<String, Vec<Cookie>>,
}

impl HostCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for `host`.
    pub fn save(&self, host: &str, cookies: Vec<Cookie>) {
        self.cookies.insert(host.to_string(), cookies);
    }

    /// Cookies last saved for `host`, empty if none.
    pub fn load(&self, host: &str) -> Vec<Cookie> {
        self.cookies
            .get(host)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }
}

impl reqwest::cookie::CookieStore for HostCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let Some(host) = url.host_str() else {
            return;
        };
        let cookies = cookie_headers
            .filter_map(|value| value.to_str().ok())
            .filter_map(Cookie::parse)
            .collect();
        self.save(host, cookies);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let cookies = self.load(url.host_str()?);
        if cookies.is_empty() {
            return None;
        }
        let header = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&header).ok()
    }
}
