//! HTTP Digest response computation (RFC 7616, RFC 2617 compatible).

use super::challenge::Challenge;
use super::credentials::Credentials;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Md5,
    Md5Sess,
    Sha256,
    Sha256Sess,
}

impl Algorithm {
    /// Missing `algorithm` means MD5.
    fn parse(value: Option<&str>) -> Option<Self> {
        let Some(value) = value else {
            return Some(Self::Md5);
        };
        match value.to_ascii_uppercase().as_str() {
            "MD5" => Some(Self::Md5),
            "MD5-SESS" => Some(Self::Md5Sess),
            "SHA-256" => Some(Self::Sha256),
            "SHA-256-SESS" => Some(Self::Sha256Sess),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Md5Sess => "MD5-sess",
            Self::Sha256 => "SHA-256",
            Self::Sha256Sess => "SHA-256-sess",
        }
    }

    fn is_session(&self) -> bool {
        matches!(self, Self::Md5Sess | Self::Sha256Sess)
    }

    fn hash(&self, data: &[u8]) -> String {
        match self {
            Self::Md5 | Self::Md5Sess => format!("{:x}", md5::compute(data)),
            Self::Sha256 | Self::Sha256Sess => hex::encode(Sha256::digest(data)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    Auth,
    AuthInt,
}

impl Qop {
    fn select(offered: Option<&str>) -> Option<Self> {
        let offered: Vec<String> = offered?
            .split(',')
            .map(|q| q.trim().to_ascii_lowercase())
            .collect();
        if offered.iter().any(|q| q == "auth") {
            Some(Self::Auth)
        } else if offered.iter().any(|q| q == "auth-int") {
            Some(Self::AuthInt)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::AuthInt => "auth-int",
        }
    }
}

/// The server side of a Digest exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: Algorithm,
    pub qop: Option<Qop>,
    pub stale: bool,
}

impl DigestChallenge {
    /// Returns `None` for non-Digest challenges, a missing nonce or an
    /// algorithm we cannot compute.
    pub fn from_challenge(challenge: &Challenge) -> Option<Self> {
        if !challenge.is_digest() {
            return None;
        }
        Some(Self {
            realm: challenge.realm().unwrap_or_default().to_string(),
            nonce: challenge.param("nonce")?.to_string(),
            opaque: challenge.param("opaque").map(str::to_string),
            algorithm: Algorithm::parse(challenge.param("algorithm"))?,
            qop: Qop::select(challenge.param("qop")),
            stale: challenge
                .param("stale")
                .is_some_and(|s| s.eq_ignore_ascii_case("true")),
        })
    }

    /// Build the `Authorization` header value for one request.
    ///
    /// `uri` is the request target (path and query), `nc` the nonce count for
    /// this nonce, `body` the entity body for `auth-int`.
    pub fn respond(
        &self,
        credentials: &Credentials,
        method: &str,
        uri: &str,
        body: Option<&[u8]>,
        nc: u32,
        cnonce: &str,
    ) -> String {
        let algorithm = self.algorithm;
        let nc_value = format!("{:08x}", nc);

        let mut ha1 = algorithm.hash(
            format!(
                "{}:{}:{}",
                credentials.username, self.realm, credentials.password
            )
            .as_bytes(),
        );
        if algorithm.is_session() {
            ha1 = algorithm.hash(format!("{}:{}:{}", ha1, self.nonce, cnonce).as_bytes());
        }

        let ha2 = match self.qop {
            Some(Qop::AuthInt) => {
                let body_hash = algorithm.hash(body.unwrap_or_default());
                algorithm.hash(format!("{}:{}:{}", method, uri, body_hash).as_bytes())
            }
            _ => algorithm.hash(format!("{}:{}", method, uri).as_bytes()),
        };

        let response = match self.qop {
            Some(qop) => algorithm.hash(
                format!(
                    "{}:{}:{}:{}:{}:{}",
                    ha1,
                    self.nonce,
                    nc_value,
                    cnonce,
                    qop.name(),
                    ha2
                )
                .as_bytes(),
            ),
            None => algorithm.hash(format!("{}:{}:{}", ha1, self.nonce, ha2).as_bytes()),
        };

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", algorithm={}, response="{}""#,
            quote(&credentials.username),
            quote(&self.realm),
            quote(&self.nonce),
            quote(uri),
            algorithm.name(),
            response
        );
        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{}""#, quote(opaque)));
        }
        if let Some(qop) = self.qop {
            header.push_str(&format!(
                r#", qop={}, nc={}, cnonce="{}""#,
                qop.name(),
                nc_value,
                quote(cnonce)
            ));
        }
        header
    }
}

/// Fresh client nonce.
pub fn generate_cnonce() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
