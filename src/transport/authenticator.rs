//! Challenge-response authentication with a per-origin cache.
//!
//! A 401/407 is answered once using credentials resolved from the
//! [`SessionRegistry`]. The resulting authenticator (Basic header, or Digest
//! nonce plus counter) is cached per origin, so later requests attach
//! `Authorization` up front instead of taking another round trip.

use super::registry::SessionRegistry;
use crate::auth::challenge::{Challenge, parse_challenges, preferred};
use crate::auth::digest::{DigestChallenge, generate_cnonce};
use crate::auth::Credentials;
use dashmap::DashMap;
use reqwest::StatusCode;
use reqwest::header::{
    AUTHORIZATION, HeaderMap, HeaderName, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION,
    WWW_AUTHENTICATE,
};
use tracing::debug;
use url::Url;

/// Which side issued the challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// 401 from the origin server.
    Origin,
    /// 407 from a proxy.
    Proxy,
}

impl ChallengeKind {
    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::UNAUTHORIZED => Some(Self::Origin),
            StatusCode::PROXY_AUTHENTICATION_REQUIRED => Some(Self::Proxy),
            _ => None,
        }
    }

    pub fn challenge_header(&self) -> HeaderName {
        match self {
            Self::Origin => WWW_AUTHENTICATE,
            Self::Proxy => PROXY_AUTHENTICATE,
        }
    }

    pub fn credentials_header(&self) -> HeaderName {
        match self {
            Self::Origin => AUTHORIZATION,
            Self::Proxy => PROXY_AUTHORIZATION,
        }
    }

    /// Cache key for `url` under this kind.
    pub fn cache_key(&self, url: &Url) -> String {
        let origin = format!(
            "{}://{}:{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.port_or_known_default().unwrap_or_default()
        );
        match self {
            Self::Origin => origin,
            Self::Proxy => format!("proxy:{}", origin),
        }
    }
}

/// State kept between requests for one origin.
#[derive(Debug, Clone)]
pub enum CachedAuthenticator {
    Basic {
        header: String,
    },
    Digest {
        challenge: DigestChallenge,
        credentials: Credentials,
        nonce_count: u32,
    },
}

impl CachedAuthenticator {
    /// `None` when the challenge is neither Basic nor a usable Digest.
    pub fn from_challenge(challenge: &Challenge, credentials: Credentials) -> Option<Self> {
        if challenge.is_basic() {
            return Some(Self::Basic {
                header: credentials.basic_header(),
            });
        }
        let challenge = DigestChallenge::from_challenge(challenge)?;
        Some(Self::Digest {
            challenge,
            credentials,
            nonce_count: 0,
        })
    }

    /// Header value for the next request. Digest bumps the nonce count.
    pub fn authorize(&mut self, method: &str, url: &Url, body: Option<&[u8]>) -> String {
        match self {
            Self::Basic { header } => header.clone(),
            Self::Digest {
                challenge,
                credentials,
                nonce_count,
            } => {
                *nonce_count += 1;
                challenge.respond(
                    credentials,
                    method,
                    &request_target(url),
                    body,
                    *nonce_count,
                    &generate_cnonce(),
                )
            }
        }
    }
}

/// Authenticators keyed by [`ChallengeKind::cache_key`].
#[derive(Debug, Default)]
pub struct AuthCache {
    entries: DashMap<String, CachedAuthenticator>,
}

impl AuthCache {
    pub fn insert(&self, key: String, authenticator: CachedAuthenticator) {
        self.entries.insert(key, authenticator);
    }

    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Proactive header from a cached authenticator, if one exists.
    pub fn authorize(&self, key: &str, method: &str, url: &Url, body: Option<&[u8]>) -> Option<String> {
        let mut entry = self.entries.get_mut(key)?;
        Some(entry.value_mut().authorize(method, url, body))
    }
}

/// Header to attach before sending, taken from the cache.
pub fn cached_authorization(
    registry: &SessionRegistry,
    kind: ChallengeKind,
    method: &str,
    url: &Url,
    body: Option<&[u8]>,
) -> Option<String> {
    registry
        .auth_cache()
        .authorize(&kind.cache_key(url), method, url, body)
}

/// Answer a challenge found in `headers`.
///
/// `rejected_retry` is set when the failed request already carried a header
/// computed from a fresh challenge; such a request is only retried when the
/// server marks the nonce stale. Returns `None` when no retry should happen,
/// leaving the original failure visible.
pub fn authenticate(
    registry: &SessionRegistry,
    kind: ChallengeKind,
    headers: &HeaderMap,
    method: &str,
    url: &Url,
    body: Option<&[u8]>,
    rejected_retry: bool,
) -> Option<String> {
    let challenges = parse_challenges(
        headers
            .get_all(kind.challenge_header())
            .iter()
            .filter_map(|v| v.to_str().ok()),
    );
    let challenge = preferred(&challenges)?;

    if rejected_retry {
        let stale = DigestChallenge::from_challenge(challenge).is_some_and(|d| d.stale);
        if !stale {
            debug!("Credentials rejected for {}, giving up", url);
            return None;
        }
    }

    let credentials = registry.password_authentication(url.host_str())?;
    let mut authenticator = CachedAuthenticator::from_challenge(challenge, credentials)?;
    let header = authenticator.authorize(method, url, body);
    registry
        .auth_cache()
        .insert(kind.cache_key(url), authenticator);

    debug!("Answering {} challenge for {}", challenge.scheme, url);
    Some(header)
}

fn request_target(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}
