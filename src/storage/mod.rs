//! Storage abstraction and its WebDAV implementation.

pub mod dav;
pub mod file;
pub mod notify;
pub mod webdav;

pub use dav::{ByteStream, DavClient, DavResource};
pub use file::{PlayHistory, StorageFile};
pub use notify::{LogNotifier, Notifier};
pub use webdav::{AdapterState, WebDavStorage};

use crate::error::Result;
use crate::library::MediaLibrary;
use async_trait::async_trait;
use std::collections::HashMap;

/// A browsable media library.
///
/// Network operations never fail across this boundary: failures become an
/// empty listing, `None`, the unmodified URL or `false`, and are logged.
#[async_trait]
pub trait Storage: Send + Sync {
    fn library(&self) -> &MediaLibrary;

    /// Root directory of the library. Errors only on a malformed base URL.
    async fn get_root_file(&self) -> Result<StorageFile>;

    async fn open_file(&self, file: &StorageFile) -> Option<ByteStream>;

    /// Children of `file`, never including `file` itself.
    async fn list_files(&self, file: &StorageFile) -> Vec<StorageFile>;

    /// Descriptor for `path` without contacting the server.
    async fn path_file(&self, path: &str, is_directory: bool) -> Result<StorageFile>;

    async fn history_file(&self, history: &PlayHistory) -> Option<StorageFile>;

    /// A URL an external player can open without sharing this client's
    /// session state.
    async fn create_play_url(&self, file: &StorageFile) -> String;

    /// Headers for consumers that fetch `create_play_url` results themselves.
    fn network_headers(&self) -> HashMap<String, String>;

    /// Check connectivity, reporting failures to the user.
    async fn test(&self) -> bool;
}
