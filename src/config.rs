//! Constants and transport configuration.

use std::path::PathBuf;

/// User-Agent sent by the shared transport client.
pub const TRANSPORT_USER_AGENT: &str = "PotPlayer/230523";

/// User-Agent handed to playback pipelines that fetch media on their own.
pub const PLAYER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Content type reported for synthetic directory descriptors.
pub const DIRECTORY_CONTENT_TYPE: &str = "httpd/unix-directory";

/// Content type reported for synthetic file descriptors.
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Service name used for keyring entries.
pub const KEYRING_SERVICE: &str = "davplay";

const CONFIG_DIR: &str = "davplay";
const LIBRARY_FILE: &str = "libraries.json";

/// Default location of the persisted library list.
pub fn default_library_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(LIBRARY_FILE))
}

/// Settings for the shared HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Skip server certificate and hostname verification. Enabled by default
    /// so self-signed and private-network servers work; disables MITM
    /// protection.
    pub insecure_skip_verify: bool,
    /// User-Agent written onto every outgoing request.
    pub user_agent: String,
    /// Log every request and response line at debug level.
    pub log_traffic: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            insecure_skip_verify: true,
            user_agent: TRANSPORT_USER_AGENT.to_string(),
            log_traffic: cfg!(debug_assertions),
        }
    }
}
