//! The shared HTTP transport.

use super::authenticator::{ChallengeKind, authenticate, cached_authorization};
use super::registry::SessionRegistry;
use crate::config::TransportConfig;
use crate::error::{DavPlayError, Result};
use bytes::Bytes;
use once_cell::sync::{Lazy, OnceCell};
use reqwest::header::{CONNECTION, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, Response};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const HTTP_LOG_TARGET: &str = "davplay::http";

static SHARED: Lazy<Arc<HttpTransport>> =
    Lazy::new(|| Arc::new(HttpTransport::new(TransportConfig::default())));

/// A request the transport may replay after answering a challenge.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl TransportRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// One HTTP client plus the session state it authenticates with.
///
/// The reqwest client is built on first use. Every request goes out with the
/// configured User-Agent and `Connection: close`, and idle connections are
/// never pooled: some servers lose track of authentication across a kept
/// alive connection, most visibly on range requests.
#[derive(Debug)]
pub struct HttpTransport {
    config: TransportConfig,
    registry: Arc<SessionRegistry>,
    client: OnceCell<Client>,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self::with_registry(config, Arc::new(SessionRegistry::new()))
    }

    pub fn with_registry(config: TransportConfig, registry: Arc<SessionRegistry>) -> Self {
        Self {
            config,
            registry,
            client: OnceCell::new(),
        }
    }

    /// The process-wide transport.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// The underlying client, built on first call.
    pub fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| self.build_client())
    }

    fn build_client(&self) -> Result<Client> {
        if self.config.insecure_skip_verify {
            warn!("TLS certificate and hostname verification disabled");
        }
        debug!("Building shared HTTP client");

        let client = Client::builder()
            .user_agent(self.config.user_agent.clone())
            .pool_max_idle_per_host(0)
            .cookie_provider(self.registry.cookie_jar())
            .danger_accept_invalid_certs(self.config.insecure_skip_verify)
            .danger_accept_invalid_hostnames(self.config.insecure_skip_verify)
            .build()?;
        Ok(client)
    }

    /// Send `request`, answering at most one authentication challenge.
    pub async fn execute(&self, request: TransportRequest) -> Result<Response> {
        let client = self.client()?;
        let method = request.method.as_str();
        let body = request.body.as_deref();

        let mut headers = request.headers.clone();
        self.rewrite(&mut headers)?;

        let caller_credentials = headers.contains_key(ChallengeKind::Origin.credentials_header())
            || headers.contains_key(ChallengeKind::Proxy.credentials_header());
        let mut proactive = false;
        if !caller_credentials {
            for kind in [ChallengeKind::Origin, ChallengeKind::Proxy] {
                let cached = cached_authorization(&self.registry, kind, method, &request.url, body);
                if let Some(value) = cached.and_then(|v| HeaderValue::from_str(&v).ok()) {
                    headers.insert(kind.credentials_header(), value);
                    proactive = true;
                }
            }
        }

        let response = self.send(client, &request, &request.url, headers.clone()).await?;
        let Some(kind) = ChallengeKind::from_status(response.status()) else {
            return Ok(response);
        };

        let challenged_url = response.url().clone();
        let challenge_headers = response.headers().clone();
        if proactive {
            self.registry
                .auth_cache()
                .remove(&kind.cache_key(&challenged_url));
        }

        let Some(answer) = authenticate(
            &self.registry,
            kind,
            &challenge_headers,
            method,
            &challenged_url,
            body,
            caller_credentials,
        ) else {
            return Ok(response);
        };
        let answer = match HeaderValue::from_str(&answer) {
            Ok(value) => value,
            Err(e) => {
                warn!("Unusable authorization header for {}: {}", challenged_url, e);
                return Ok(response);
            }
        };
        drop(response);

        headers.insert(kind.credentials_header(), answer);
        self.send(client, &request, &challenged_url, headers).await
    }

    /// Force the configured User-Agent and connection closure.
    fn rewrite(&self, headers: &mut HeaderMap) -> Result<()> {
        let agent = HeaderValue::from_str(&self.config.user_agent)
            .map_err(|e| DavPlayError::Config(format!("invalid user agent: {}", e)))?;
        headers.insert(USER_AGENT, agent);
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        Ok(())
    }

    async fn send(
        &self,
        client: &Client,
        request: &TransportRequest,
        url: &Url,
        headers: HeaderMap,
    ) -> Result<Response> {
        if self.config.log_traffic {
            debug!(target: HTTP_LOG_TARGET, "--> {} {}", request.method, url);
        }

        let mut builder = client
            .request(request.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        if self.config.log_traffic {
            debug!(
                target: HTTP_LOG_TARGET,
                "<-- {} {} ({:?})",
                response.status(),
                response.url(),
                response.content_length()
            );
        }
        Ok(response)
    }
}
