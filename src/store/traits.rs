//! Storage strategy trait definition

use crate::model::{Blob, BlobMetadata};
use crate::{Error, Result};

/// Where containers and blobs physically live
///
/// Implementations:
/// - [`TransientStorage`](super::TransientStorage): process memory
/// - [`FilesystemStorage`](super::FilesystemStorage): one directory per container
///
/// Strategies store blobs exactly as given; hashing and timestamps are applied
/// by [`BlobStore`](crate::BlobStore) before `put_blob` is called. Every
/// method addressing a blob fails with [`Error::ContainerNotFound`] when the
/// container is absent, except `remove_blob`, which is then a no-op.
pub trait StorageStrategy: Send + Sync {
    /// Short name used in logs and synthesized URIs
    fn kind(&self) -> &'static str;

    fn container_exists(&self, container: &str) -> Result<bool>;

    /// All container names, sorted
    fn container_names(&self) -> Result<Vec<String>>;

    /// Create an empty container unless one exists; returns whether it was created
    fn create_container(&self, container: &str, location: &str) -> Result<bool>;

    /// Remove a container and everything in it; absent containers are ignored
    fn delete_container(&self, container: &str) -> Result<()>;

    /// Remove a container only if it holds no blobs.
    /// Returns false when blobs remain.
    fn delete_container_if_empty(&self, container: &str) -> Result<bool> {
        if !self.container_exists(container)? {
            return Ok(true);
        }
        if self.blob_count(container)? > 0 {
            return Ok(false);
        }
        self.delete_container(container)?;
        Ok(true)
    }

    /// Remove every blob, keeping the container and its location
    fn clear_container(&self, container: &str) -> Result<()>;

    /// Location tag of a container, `None` when it does not exist
    fn location(&self, container: &str) -> Result<Option<String>>;

    fn blob_exists(&self, container: &str, key: &str) -> Result<bool>;

    /// Store an already stamped blob, replacing any blob of the same name
    fn put_blob(&self, container: &str, blob: Blob) -> Result<()>;

    /// The stored blob, or `None` when the key is absent
    fn get_blob(&self, container: &str, key: &str) -> Result<Option<Blob>>;

    /// Metadata of a stored blob without its payload
    fn blob_metadata(&self, container: &str, key: &str) -> Result<Option<BlobMetadata>> {
        Ok(self.get_blob(container, key)?.map(|blob| blob.metadata))
    }

    fn remove_blob(&self, container: &str, key: &str) -> Result<()>;

    /// Snapshot of the metadata of every blob in a container, in no particular order
    fn list_metadata(&self, container: &str) -> Result<Vec<BlobMetadata>>;

    fn blob_count(&self, container: &str) -> Result<usize> {
        Ok(self.list_metadata(container)?.len())
    }

    /// Canonical URI for a blob that was stored without one
    fn blob_uri(&self, container: &str, key: &str) -> Result<String>;
}

pub(crate) fn container_not_found(container: &str) -> Error {
    Error::ContainerNotFound(container.to_string())
}
