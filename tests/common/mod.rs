//! In-process WebDAV stub server for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::Response;
use base64::Engine;
use davplay::auth::parse_challenges;
use davplay::storage::Notifier;
use davplay::{HttpTransport, TransportConfig};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const MOVIE_BYTES: &[u8] = b"not really an mp4";

const ROOT_LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/dav/</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/dav/movie.mp4</d:href>
    <d:propstat><d:prop>
      <d:resourcetype/>
      <d:getcontenttype>video/mp4</d:getcontenttype>
      <d:getcontentlength>17</d:getcontentlength>
    </d:prop></d:propstat>
  </d:response>
  <d:response>
    <d:href>/dav/Shows/</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

// The directory echoes itself back without its trailing slash.
const SHOWS_LISTING: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:multistatus xmlns:d="DAV:">
  <d:response>
    <d:href>/dav/Shows</d:href>
    <d:propstat><d:prop><d:resourcetype><d:collection/></d:resourcetype></d:prop></d:propstat>
  </d:response>
</d:multistatus>"#;

pub const USER: &str = "alice";
pub const PASSWORD: &str = "p@ss word";
const REALM: &str = "stub";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Open,
    Basic,
    Digest,
    /// Digest challenges sent as 407 / `Proxy-Authenticate`.
    ProxyDigest,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub proxy_authorization: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
    pub connection: Option<String>,
}

#[derive(Debug)]
pub struct ServerState {
    mode: AuthMode,
    set_cookie: Option<&'static str>,
    nonce: Mutex<String>,
    pub challenges: AtomicUsize,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl ServerState {
    pub fn challenge_count(&self) -> usize {
        self.challenges.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Invalidate the current nonce, as a server restart would.
    pub fn rotate_nonce(&self, nonce: &str) {
        *self.nonce.lock().unwrap() = nonce.to_string();
    }
}

pub struct StubServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
}

impl StubServer {
    pub async fn start(mode: AuthMode) -> Self {
        Self::start_with_cookie(mode, None).await
    }

    pub async fn start_with_cookie(mode: AuthMode, set_cookie: Option<&'static str>) -> Self {
        let state = Arc::new(ServerState {
            mode,
            set_cookie,
            nonce: Mutex::new("nonce-1".to_string()),
            challenges: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// A transport with its own registry, isolated from other tests.
pub fn isolated_transport() -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(TransportConfig {
        log_traffic: false,
        ..TransportConfig::default()
    }))
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn show_error(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn handle(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let authorization = header_string(&headers, header::AUTHORIZATION);
    let proxy_authorization = header_string(&headers, header::PROXY_AUTHORIZATION);
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: authorization.clone(),
        proxy_authorization: proxy_authorization.clone(),
        cookie: header_string(&headers, header::COOKIE),
        user_agent: header_string(&headers, header::USER_AGENT),
        connection: header_string(&headers, header::CONNECTION),
    });

    let credentials = match state.mode {
        AuthMode::ProxyDigest => proxy_authorization,
        _ => authorization,
    };
    if !authorized(&state, &method, &uri, credentials.as_deref()) {
        state.challenges.fetch_add(1, Ordering::SeqCst);
        let challenge = match state.mode {
            AuthMode::Basic => format!(r#"Basic realm="{}""#, REALM),
            _ => format!(
                r#"Digest realm="{}", nonce="{}", qop="auth", algorithm=MD5"#,
                REALM,
                state.nonce.lock().unwrap()
            ),
        };
        let (status, challenge_header) = match state.mode {
            AuthMode::ProxyDigest => (
                StatusCode::PROXY_AUTHENTICATION_REQUIRED,
                header::PROXY_AUTHENTICATE,
            ),
            _ => (StatusCode::UNAUTHORIZED, header::WWW_AUTHENTICATE),
        };
        return Response::builder()
            .status(status)
            .header(challenge_header, challenge)
            .body(Body::empty())
            .unwrap();
    }

    let mut builder = Response::builder();
    if let Some(cookie) = state.set_cookie {
        builder = builder.header(header::SET_COOKIE, cookie);
    }

    match (method.as_str(), uri.path()) {
        ("PROPFIND", "/dav/") => builder
            .status(StatusCode::MULTI_STATUS)
            .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(Body::from(ROOT_LISTING))
            .unwrap(),
        ("PROPFIND", "/dav/Shows/") => builder
            .status(StatusCode::MULTI_STATUS)
            .header(header::CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(Body::from(SHOWS_LISTING))
            .unwrap(),
        ("GET", "/dav/movie.mp4") => builder
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "video/mp4")
            .body(Body::from(MOVIE_BYTES))
            .unwrap(),
        _ => builder
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap(),
    }
}

fn authorized(state: &ServerState, method: &Method, uri: &Uri, authorization: Option<&str>) -> bool {
    match state.mode {
        AuthMode::Open => true,
        AuthMode::Basic => {
            let expected = format!(
                "Basic {}",
                base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", USER, PASSWORD))
            );
            authorization == Some(expected.as_str())
        }
        AuthMode::Digest | AuthMode::ProxyDigest => {
            let Some(authorization) = authorization else {
                return false;
            };
            let parsed = parse_challenges([authorization]);
            let Some(digest) = parsed.first().filter(|c| c.is_digest()) else {
                return false;
            };
            let param = |name: &str| digest.param(name).unwrap_or_default().to_string();

            let target = uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_default();
            if param("username") != USER
                || param("nonce") != *state.nonce.lock().unwrap()
                || param("uri") != target
            {
                return false;
            }

            let md5_hex = |data: String| format!("{:x}", md5::compute(data.as_bytes()));
            let ha1 = md5_hex(format!("{}:{}:{}", USER, REALM, PASSWORD));
            let ha2 = md5_hex(format!("{}:{}", method, target));
            let expected = md5_hex(format!(
                "{}:{}:{}:{}:{}:{}",
                ha1,
                param("nonce"),
                param("nc"),
                param("cnonce"),
                param("qop"),
                ha2
            ));
            param("response") == expected
        }
    }
}
