//! davplay - a WebDAV storage client for media playback.
//!
//! A [`WebDavStorage`] presents one WebDAV library as a browsable tree and
//! produces URLs an external player can open directly. All libraries share
//! one [`HttpTransport`], which keeps authentication working against servers
//! with self-signed certificates, mixed Basic/Digest challenges and
//! cookie-bound sessions.
//!
//! ```no_run
//! use davplay::{MediaLibrary, Storage, WebDavStorage};
//!
//! # async fn run() -> davplay::Result<()> {
//! let library = MediaLibrary::new("nas", "https://nas.local/dav/")
//!     .with_credentials("alice", "secret");
//! let storage = WebDavStorage::new(library);
//!
//! let root = storage.get_root_file().await?;
//! for file in storage.list_files(&root).await {
//!     println!("{} -> {}", file.file_name(), storage.create_play_url(&file).await);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod library;
pub mod storage;
pub mod transport;

pub use config::TransportConfig;
pub use error::{DavPlayError, ErrorKind, Result};
pub use library::{LibraryFile, MediaLibrary};
pub use storage::{PlayHistory, Storage, StorageFile, WebDavStorage};
pub use transport::{HttpTransport, SessionRegistry};
