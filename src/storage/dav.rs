//! Minimal WebDAV client: PROPFIND listing and GET download.

use crate::error::{DavPlayError, Result};
use crate::transport::{HttpTransport, TransportRequest};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::BoxStream;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const PROPFIND_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
  <D:prop>
    <D:displayname/>
    <D:resourcetype/>
    <D:getcontenttype/>
    <D:getcontentlength/>
    <D:getlastmodified/>
  </D:prop>
</D:propfind>"#;

/// Streaming response body.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// One `<response>` entry of a multistatus body.
#[derive(Debug, Clone, PartialEq)]
pub struct DavResource {
    /// Absolute URL, resolved against the request URL.
    pub href: Url,
    pub is_collection: bool,
    pub display_name: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct DavClient {
    transport: Arc<HttpTransport>,
}

impl DavClient {
    pub fn new(transport: Arc<HttpTransport>) -> Self {
        Self { transport }
    }

    /// `PROPFIND` with `Depth: 1`. The result includes the entry for `url`
    /// itself when the server reports it.
    pub async fn list(&self, url: &Url) -> Result<Vec<DavResource>> {
        let method = Method::from_bytes(b"PROPFIND")
            .map_err(|e| DavPlayError::Config(e.to_string()))?;
        let request = TransportRequest::new(method, url.clone())
            .header(HeaderName::from_static("depth"), HeaderValue::from_static("1"))
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/xml; charset=utf-8"),
            )
            .body(PROPFIND_BODY);

        let response = check_status(self.transport.execute(request).await?)?;
        let base = response.url().clone();
        let body = response.text().await?;
        debug!("PROPFIND {} returned {} bytes", base, body.len());

        parse_multistatus(&body, &base, self.transport.registry().xml_strict())
    }

    /// `GET` the resource and stream its body.
    pub async fn get(&self, url: &Url) -> Result<ByteStream> {
        let request = TransportRequest::new(Method::GET, url.clone());
        let response = check_status(self.transport.execute(request).await?)?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(DavPlayError::from))
            .boxed())
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::PROXY_AUTHENTICATION_REQUIRED {
        return Err(DavPlayError::Unauthorized {
            url: response.url().to_string(),
        });
    }
    if !status.is_success() {
        return Err(DavPlayError::Status {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    Ok(response)
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Href,
    DisplayName,
    ContentType,
    ContentLength,
    LastModified,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"href" => Some(Self::Href),
            b"displayname" => Some(Self::DisplayName),
            b"getcontenttype" => Some(Self::ContentType),
            b"getcontentlength" => Some(Self::ContentLength),
            b"getlastmodified" => Some(Self::LastModified),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PartialResource {
    href: Option<String>,
    is_collection: bool,
    display_name: Option<String>,
    content_type: Option<String>,
    content_length: Option<u64>,
    last_modified: Option<DateTime<Utc>>,
}

impl PartialResource {
    fn set(&mut self, field: Field, text: String) {
        let text = text.trim().to_string();
        match field {
            Field::Href => self.href = Some(text),
            Field::DisplayName => self.display_name = Some(text),
            Field::ContentType => self.content_type = Some(text),
            Field::ContentLength => self.content_length = text.parse().ok(),
            Field::LastModified => {
                self.last_modified = DateTime::parse_from_rfc2822(&text)
                    .ok()
                    .map(|d| d.with_timezone(&Utc));
            }
        }
    }

    fn finish(self, base: &Url) -> Option<DavResource> {
        let href = self.href?;
        let resolved = match base.join(&href) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping entry with unusable href {}: {}", href, e);
                return None;
            }
        };
        Some(DavResource {
            href: resolved,
            is_collection: self.is_collection,
            display_name: self.display_name,
            content_type: self.content_type,
            content_length: self.content_length,
            last_modified: self.last_modified,
        })
    }
}

/// Parse a `207 Multi-Status` body.
///
/// Elements are matched by local name, so any namespace prefix works. In
/// strict mode mismatched end tags, bad escapes and a missing `multistatus`
/// root fail the whole listing; otherwise parsing stops at the first error
/// and keeps what was read so far.
pub fn parse_multistatus(xml: &str, base: &Url, strict: bool) -> Result<Vec<DavResource>> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = strict;

    let mut resources = Vec::new();
    let mut current: Option<PartialResource> = None;
    let mut field: Option<Field> = None;
    let mut saw_multistatus = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"multistatus" => saw_multistatus = true,
                b"response" => current = Some(PartialResource::default()),
                b"collection" => {
                    if let Some(resource) = current.as_mut() {
                        resource.is_collection = true;
                    }
                }
                name => field = Field::from_local_name(name),
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"collection" {
                    if let Some(resource) = current.as_mut() {
                        resource.is_collection = true;
                    }
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(resource), Some(f)) = (current.as_mut(), field) {
                    let text = match t.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(e) if strict => return Err(DavPlayError::Xml(e.to_string())),
                        Err(_) => String::from_utf8_lossy(&t).into_owned(),
                    };
                    resource.set(f, text);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(resource), Some(f)) = (current.as_mut(), field) {
                    resource.set(f, String::from_utf8_lossy(&t).into_owned());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"response" {
                    if let Some(resource) = current.take().and_then(|r| r.finish(base)) {
                        resources.push(resource);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                let position = reader.buffer_position();
                if strict {
                    return Err(DavPlayError::Xml(format!("at byte {}: {}", position, e)));
                }
                warn!("Lenient PROPFIND parse stopped at byte {}: {}", position, e);
                break;
            }
        }
    }

    if strict && !saw_multistatus {
        return Err(DavPlayError::Xml("missing multistatus element".to_string()));
    }
    Ok(resources)
}
