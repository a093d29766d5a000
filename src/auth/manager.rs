//! Keyring-backed storage for library passwords.

use super::credentials::Credentials;
use crate::config::KEYRING_SERVICE;
use crate::error::{DavPlayError, Result};
use crate::library::MediaLibrary;
use tracing::{debug, error, info};

/// Stores and retrieves library credentials in the system keyring so the
/// library file never holds a password.
#[derive(Debug, Clone)]
pub struct AuthManager {
    service: String,
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    /// Get a unique key for storing a library's credentials in the keyring.
    pub fn keyring_key(library: &str) -> String {
        format!("davplay-{}", library)
    }

    /// Store credentials for a library.
    pub fn store(&self, library: &str, credentials: &Credentials) -> Result<()> {
        let keyring_key = Self::keyring_key(library);
        debug!("Storing credentials in keyring: {}", keyring_key);

        let entry = keyring::Entry::new(&self.service, &keyring_key)
            .map_err(|e| DavPlayError::Keyring(e.to_string()))?;
        let serialized = serde_json::to_string(credentials)?;
        entry
            .set_password(&serialized)
            .map_err(|e| DavPlayError::Keyring(e.to_string()))?;

        info!("Credentials stored in system keyring for library: {}", library);
        Ok(())
    }

    /// Load credentials for a library, `None` if nothing is stored.
    pub fn load(&self, library: &str) -> Result<Option<Credentials>> {
        let keyring_key = Self::keyring_key(library);
        debug!("Attempting to load credentials from keyring: {}", keyring_key);

        match keyring::Entry::new(&self.service, &keyring_key) {
            Ok(entry) => match entry.get_password() {
                Ok(password) => {
                    if let Ok(cred) = serde_json::from_str::<Credentials>(&password) {
                        return Ok(Some(cred));
                    }
                    Ok(None)
                }
                Err(_) => {
                    debug!("No credentials found in keyring: {}", keyring_key);
                    Ok(None)
                }
            },
            Err(e) => {
                error!("Keyring error: {}", e);
                Err(DavPlayError::Keyring(e.to_string()))
            }
        }
    }

    /// Remove a library's credentials.
    pub fn clear(&self, library: &str) -> Result<()> {
        let keyring_key = Self::keyring_key(library);
        debug!("Clearing credentials from keyring: {}", keyring_key);

        let entry = keyring::Entry::new(&self.service, &keyring_key)
            .map_err(|e| DavPlayError::Keyring(e.to_string()))?;
        entry
            .delete_credential()
            .map_err(|e| DavPlayError::Keyring(e.to_string()))
    }

    /// Fill in a library's account and password from the keyring when the
    /// library itself carries none. Keyring failures are logged, not fatal.
    pub fn fill(&self, library: &mut MediaLibrary) {
        if library.password.is_some() {
            return;
        }
        match self.load(&library.name) {
            Ok(Some(credentials)) => {
                if library.account.is_none() {
                    library.account = Some(credentials.username);
                }
                library.password = Some(credentials.password);
            }
            Ok(None) => {}
            Err(e) => error!("Failed to read credentials for {}: {}", library.name, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyring_key() {
        assert_eq!(AuthManager::keyring_key("nas"), "davplay-nas");
    }

    #[test]
    fn test_fill_keeps_explicit_password() {
        let manager = AuthManager::new();
        let mut library = MediaLibrary::new("nas", "http://host/").with_credentials("u", "p");
        manager.fill(&mut library);
        assert_eq!(library.password.as_deref(), Some("p"));
    }
}
