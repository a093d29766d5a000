//! Username/password pairs used for WebDAV authentication.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A username/password pair registered for a host.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Get the Basic `Authorization` header value for this credential.
    pub fn basic_header(&self) -> String {
        let combined = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&combined);
        format!("Basic {}", encoded)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let creds = Credentials::new("user", "pass");
        let header = creds.basic_header();
        assert!(header.starts_with("Basic "));
        assert_eq!(header, "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = Credentials::new("user", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("user"));
        assert!(!printed.contains("hunter2"));
    }
}
