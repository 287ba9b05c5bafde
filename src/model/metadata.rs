//! Metadata records for blobs, containers and listing entries

use super::ETag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content type used when a blob is stored without one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type marking a blob as a directory placeholder
pub const DIRECTORY_CONTENT_TYPE: &str = "application/directory";

/// Name suffix of directory placeholder blobs
pub const DIRECTORY_SUFFIX: &str = "_$folder$";

/// Kind of entry in a listing
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StorageType {
    Blob,
    Container,
    /// A virtual directory produced by listing; never persisted
    RelativePath,
}

/// HTTP content headers of a payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub content_type: String,
    pub content_length: u64,
    pub content_md5: Option<[u8; 16]>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
}

impl Default for ContentMetadata {
    fn default() -> Self {
        ContentMetadata {
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content_length: 0,
            content_md5: None,
            content_disposition: None,
            content_encoding: None,
            content_language: None,
        }
    }
}

/// Metadata of a stored blob
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub name: String,
    /// Container holding the blob, set when stored
    pub container: Option<String>,
    pub etag: ETag,
    pub last_modified: DateTime<Utc>,
    pub user_metadata: BTreeMap<String, String>,
    pub uri: Option<String>,
    pub content: ContentMetadata,
}

impl BlobMetadata {
    /// Metadata for a blob that has not been stored yet
    pub fn new(name: impl Into<String>) -> Self {
        BlobMetadata {
            name: name.into(),
            container: None,
            etag: ETag::EMPTY,
            last_modified: Utc::now(),
            user_metadata: BTreeMap::new(),
            uri: None,
            content: ContentMetadata::default(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.content_length
    }

    /// Whether this blob is a directory placeholder rather than data
    pub fn is_directory_marker(&self) -> bool {
        self.directory_name().is_some()
    }

    /// Name of the directory this blob stands for, if it is a placeholder
    pub fn directory_name(&self) -> Option<&str> {
        if let Some(dir) = self.name.strip_suffix(DIRECTORY_SUFFIX) {
            return Some(dir);
        }
        if let Some(dir) = self.name.strip_suffix('/') {
            return Some(dir);
        }
        if self.content.content_type == DIRECTORY_CONTENT_TYPE {
            return Some(&self.name);
        }
        None
    }
}

/// A single entry of a listing: blob, container or virtual directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageMetadata {
    pub kind: StorageType,
    pub name: String,
    pub etag: Option<ETag>,
    pub last_modified: Option<DateTime<Utc>>,
    pub size: Option<u64>,
    pub location: Option<String>,
    pub uri: Option<String>,
    pub user_metadata: BTreeMap<String, String>,
}

impl StorageMetadata {
    pub fn container(name: impl Into<String>, location: impl Into<String>) -> Self {
        StorageMetadata {
            kind: StorageType::Container,
            name: name.into(),
            etag: None,
            last_modified: None,
            size: None,
            location: Some(location.into()),
            uri: None,
            user_metadata: BTreeMap::new(),
        }
    }

    pub fn relative_path(name: impl Into<String>) -> Self {
        StorageMetadata {
            kind: StorageType::RelativePath,
            name: name.into(),
            etag: None,
            last_modified: None,
            size: None,
            location: None,
            uri: None,
            user_metadata: BTreeMap::new(),
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == StorageType::Blob
    }

    pub fn is_relative_path(&self) -> bool {
        self.kind == StorageType::RelativePath
    }
}

impl From<&BlobMetadata> for StorageMetadata {
    fn from(md: &BlobMetadata) -> Self {
        StorageMetadata {
            kind: StorageType::Blob,
            name: md.name.clone(),
            etag: Some(md.etag),
            last_modified: Some(md.last_modified),
            size: Some(md.content.content_length),
            location: None,
            uri: md.uri.clone(),
            user_metadata: md.user_metadata.clone(),
        }
    }
}
