//! Remote file and directory descriptors.

use super::dav::DavResource;
use crate::config::{DIRECTORY_CONTENT_TYPE, FILE_CONTENT_TYPE};
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// A playback history record as persisted by the media application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub media_name: String,
    pub url: String,
    /// Storage path recorded when the media was played, if any.
    pub storage_path: Option<String>,
    pub video_position: i64,
    pub video_duration: i64,
}

/// A file or directory on a WebDAV server.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageFile {
    url: Url,
    is_directory: bool,
    name: String,
    size: u64,
    content_type: String,
    modified: Option<DateTime<Utc>>,
    pub play_history: Option<PlayHistory>,
}

impl StorageFile {
    /// Descriptor for a location that has not been fetched from the server.
    pub fn synthetic(url: Url, is_directory: bool) -> Self {
        let content_type = if is_directory {
            DIRECTORY_CONTENT_TYPE
        } else {
            FILE_CONTENT_TYPE
        };
        Self {
            name: name_from_url(&url),
            url,
            is_directory,
            size: 0,
            content_type: content_type.to_string(),
            modified: None,
            play_history: None,
        }
    }

    pub fn from_resource(resource: DavResource) -> Self {
        let name = resource
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name_from_url(&resource.href));
        let content_type = resource.content_type.unwrap_or_else(|| {
            if resource.is_collection {
                DIRECTORY_CONTENT_TYPE.to_string()
            } else {
                FILE_CONTENT_TYPE.to_string()
            }
        });
        Self {
            url: resource.href,
            is_directory: resource.is_collection,
            name,
            size: resource.content_length.unwrap_or(0),
            content_type,
            modified: resource.last_modified,
            play_history: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn file_url(&self) -> &str {
        self.url.as_str()
    }

    /// Decoded path component of the URL, for display.
    pub fn file_path(&self) -> String {
        decoded_path(&self.url)
    }

    /// Percent-encoded path. This is the form to record in
    /// [`PlayHistory::storage_path`] and to pass back to path lookups, since
    /// decoding loses the difference between `#` and `%23`.
    pub fn storage_path(&self) -> &str {
        self.url.path()
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }
}

/// Percent-decoded URL path.
pub(crate) fn decoded_path(url: &Url) -> String {
    percent_decode_str(url.path()).decode_utf8_lossy().into_owned()
}

fn name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}
