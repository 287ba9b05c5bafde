//! Blob - a named payload plus its metadata

use super::{BlobMetadata, ETag};
use bytes::Bytes;
use std::io::Read;

/// A blob as handed to and returned from the store
#[derive(Clone, Debug)]
pub struct Blob {
    pub metadata: BlobMetadata,
    pub payload: Bytes,
}

impl Blob {
    /// Create a blob from an in-memory payload
    pub fn new(name: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        let payload = payload.into();
        let mut metadata = BlobMetadata::new(name);
        metadata.content.content_length = payload.len() as u64;
        Blob { metadata, payload }
    }

    /// Create a blob by draining a stream source into memory
    pub fn from_reader(name: impl Into<String>, mut reader: impl Read) -> std::io::Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Blob::new(name, buf))
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.metadata.content.content_type = content_type.into();
        self
    }

    /// Add a user metadata entry
    pub fn with_user_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.user_metadata.insert(key.into(), value.into());
        self
    }

    /// Set the canonical URI instead of letting the store synthesize one
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.metadata.uri = Some(uri.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn etag(&self) -> ETag {
        self.metadata.etag
    }

    pub fn content_type(&self) -> &str {
        &self.metadata.content.content_type
    }

    /// Size of the payload held by this blob
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
