//! High-level BlobStore API
//!
//! This module provides the main entry point for interacting with localblob.

use crate::model::{
    Blob, BlobMetadata, ETag, GetOptions, ListOptions, PageSet, StorageMetadata,
    DIRECTORY_CONTENT_TYPE, DIRECTORY_SUFFIX,
};
use crate::ops::{conditional, list_page, range, stamp};
use crate::store::{FilesystemStorage, StorageStrategy, TransientStorage};
use crate::{Error, Result};
use bytes::Bytes;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Location tag given to containers created without one
pub const DEFAULT_LOCATION: &str = "default";

/// The main blob store interface
///
/// Provides a convenient API for:
/// - Creating, clearing and deleting containers
/// - Storing blobs with computed ETags
/// - Conditional and ranged reads
/// - Paginated listings with virtual directories
///
/// All methods take `&self`; share a store between threads with `Arc`.
pub struct BlobStore {
    strategy: Arc<dyn StorageStrategy>,
    default_location: String,
}

impl BlobStore {
    /// Create an empty in-memory store
    pub fn transient() -> Self {
        Self::with_strategy(TransientStorage::new())
    }

    /// Open a disk-backed store rooted at `path`
    pub fn filesystem(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_strategy(FilesystemStorage::open(path)?))
    }

    /// Wrap any storage strategy
    pub fn with_strategy(strategy: impl StorageStrategy + 'static) -> Self {
        BlobStore {
            strategy: Arc::new(strategy),
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }

    /// Set the location used when a container is created without one
    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    /// Name of the backing strategy ("transient" or "filesystem")
    pub fn kind(&self) -> &'static str {
        self.strategy.kind()
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    // === Container Operations ===

    /// Create a container unless it already exists.
    ///
    /// Returns `false`, leaving the existing container untouched, when one of
    /// that name is already present.
    pub fn create_container_in_location(
        &self,
        container: &str,
        location: Option<&str>,
    ) -> Result<bool> {
        let location = location.unwrap_or(&self.default_location);
        let created = self.strategy.create_container(container, location)?;
        if created {
            debug!(container, location, "Created container");
        }
        Ok(created)
    }

    /// Create a container, failing with [`Error::IllegalState`] if it exists
    pub fn create_container_if_absent_or_fail(
        &self,
        container: &str,
        location: Option<&str>,
    ) -> Result<()> {
        if self.create_container_in_location(container, location)? {
            Ok(())
        } else {
            Err(Error::IllegalState(format!(
                "container {} already exists",
                container
            )))
        }
    }

    pub fn container_exists(&self, container: &str) -> Result<bool> {
        self.strategy.container_exists(container)
    }

    /// Delete a container and all of its blobs; absent containers are ignored
    pub fn delete_container(&self, container: &str) -> Result<()> {
        self.strategy.delete_container(container)?;
        debug!(container, "Deleted container");
        Ok(())
    }

    /// Delete a container only if it holds no blobs.
    ///
    /// Returns `false` if blobs remain, `true` if it was deleted or absent.
    pub fn delete_container_if_empty(&self, container: &str) -> Result<bool> {
        let deleted = self.strategy.delete_container_if_empty(container)?;
        debug!(container, deleted, "Delete container if empty");
        Ok(deleted)
    }

    /// Remove every blob, keeping the container and its location
    pub fn clear_container(&self, container: &str) -> Result<()> {
        self.strategy.clear_container(container)?;
        debug!(container, "Cleared container");
        Ok(())
    }

    /// All containers with their locations, sorted by name
    pub fn list_containers(&self) -> Result<PageSet> {
        let mut entries = Vec::new();
        for name in self.strategy.container_names()? {
            // a container deleted since the names were read is skipped
            if let Some(location) = self.strategy.location(&name)? {
                entries.push(StorageMetadata::container(name, location));
            }
        }
        Ok(PageSet::new(entries, None))
    }

    /// Location tag of a container
    pub fn location_of(&self, container: &str) -> Result<String> {
        self.strategy
            .location(container)?
            .ok_or_else(|| Error::ContainerNotFound(container.to_string()))
    }

    // === Blob Operations ===

    pub fn blob_exists(&self, container: &str, key: &str) -> Result<bool> {
        self.strategy.blob_exists(container, key)
    }

    /// Store a blob, replacing any blob of the same name.
    ///
    /// The ETag, content MD5, content length and last-modified time are
    /// computed here; whatever the caller set for them is overwritten.
    pub fn put_blob(&self, container: &str, blob: Blob) -> Result<ETag> {
        let default_uri = self.strategy.blob_uri(container, blob.name())?;
        let blob = stamp(blob, container, move || default_uri);
        let etag = blob.etag();

        debug!(
            container,
            key = blob.name(),
            size = blob.size(),
            etag = %etag,
            "Put blob"
        );
        self.strategy.put_blob(container, blob)?;
        Ok(etag)
    }

    /// Read a blob, applying the preconditions and ranges in `options`.
    ///
    /// Returns `Ok(None)` when the key is absent. A ranged read returns the
    /// extracted bytes with the stored blob's ETag and last-modified time.
    pub fn get_blob(
        &self,
        container: &str,
        key: &str,
        options: &GetOptions,
    ) -> Result<Option<Blob>> {
        let Some(mut blob) = self.strategy.get_blob(container, key)? else {
            debug!(container, key, "Blob not found");
            return Ok(None);
        };

        conditional::check(options, &blob.metadata)?;

        if !options.ranges.is_empty() {
            let ranges = range::parse_ranges(&options.ranges)?;
            blob.payload = range::extract(&blob.payload, &ranges)?;
            blob.metadata.content.content_length = blob.payload.len() as u64;
        }

        Ok(Some(blob))
    }

    /// Metadata of a stored blob without reading its payload
    pub fn blob_metadata(&self, container: &str, key: &str) -> Result<BlobMetadata> {
        self.strategy
            .blob_metadata(container, key)?
            .ok_or_else(|| Error::key_not_found(container, key))
    }

    /// Remove a blob; missing blobs and containers are ignored
    pub fn remove_blob(&self, container: &str, key: &str) -> Result<()> {
        self.strategy.remove_blob(container, key)?;
        debug!(container, key, "Removed blob");
        Ok(())
    }

    /// One page of a container listing
    pub fn list(&self, container: &str, options: &ListOptions) -> Result<PageSet> {
        let snapshot = self.strategy.list_metadata(container)?;
        list_page(snapshot, options)
    }

    // === Directory Operations ===

    /// Create a placeholder blob so `path` lists as a directory even when empty
    pub fn create_directory(&self, container: &str, path: &str) -> Result<()> {
        let dir = path.trim_end_matches('/');
        if dir.is_empty() {
            return Err(Error::InvalidArgument("empty directory path".into()));
        }

        let marker = Blob::new(format!("{}{}", dir, DIRECTORY_SUFFIX), Bytes::new())
            .with_content_type(DIRECTORY_CONTENT_TYPE);
        self.put_blob(container, marker)?;
        Ok(())
    }

    /// Whether `path` has a placeholder or any blob below it
    pub fn directory_exists(&self, container: &str, path: &str) -> Result<bool> {
        let dir = path.trim_end_matches('/');
        if dir.is_empty() {
            return self.container_exists(container);
        }
        if self
            .strategy
            .blob_exists(container, &format!("{}{}", dir, DIRECTORY_SUFFIX))?
        {
            return Ok(true);
        }

        let below = ListOptions::new()
            .prefix(format!("{}/", dir))
            .max_results(1)
            .recursive();
        Ok(!self.list(container, &below)?.is_empty())
    }
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::transient()
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore")
            .field("kind", &self.kind())
            .field("default_location", &self.default_location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StorageType;
    use chrono::{Duration, Utc};

    fn store_with(container: &str) -> BlobStore {
        let store = BlobStore::transient();
        store.create_container_in_location(container, None).unwrap();
        store
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BlobStore>();
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = store_with("c1");
        let etag = store
            .put_blob("c1", Blob::new("a.txt", "hello").with_user_metadata("Owner", "me"))
            .unwrap();
        assert_eq!(etag.to_hex(), "5d41402abc4b2a76b9719d911017c592");

        let blob = store
            .get_blob("c1", "a.txt", &GetOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(&blob.payload[..], b"hello");
        assert_eq!(blob.etag(), etag);
        assert_eq!(blob.metadata.container.as_deref(), Some("c1"));
        assert_eq!(
            blob.metadata.uri.as_deref(),
            Some("transient://default/c1/a.txt")
        );
        assert_eq!(blob.metadata.user_metadata.get("owner").map(String::as_str), Some("me"));
    }

    #[test]
    fn test_default_location() {
        let store = BlobStore::transient().with_default_location("us-east");
        store.create_container_in_location("a", None).unwrap();
        store.create_container_in_location("b", Some("eu")).unwrap();

        assert_eq!(store.location_of("a").unwrap(), "us-east");
        assert_eq!(store.location_of("b").unwrap(), "eu");
        assert!(matches!(
            store.location_of("zzz"),
            Err(Error::ContainerNotFound(_))
        ));
    }

    #[test]
    fn test_create_if_absent_or_fail() {
        let store = BlobStore::transient();
        store.create_container_if_absent_or_fail("c", None).unwrap();
        assert!(matches!(
            store.create_container_if_absent_or_fail("c", None),
            Err(Error::IllegalState(_))
        ));
    }

    #[test]
    fn test_missing_key_semantics() {
        let store = store_with("c");
        let none = store.get_blob("c", "nope", &GetOptions::default()).unwrap();
        assert!(none.is_none());
        assert!(!store.blob_exists("c", "nope").unwrap());

        let err = store.blob_metadata("c", "nope").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { .. }));
        assert_eq!(err.http_status(), Some(404));

        assert!(matches!(
            store.get_blob("other", "nope", &GetOptions::default()),
            Err(Error::ContainerNotFound(_))
        ));
    }

    #[test]
    fn test_conditional_get() {
        let store = store_with("c");
        let etag = store.put_blob("c", Blob::new("k", "data")).unwrap();

        let quoted = format!("\"{}\"", etag);
        let hit = store
            .get_blob("c", "k", &GetOptions::new().if_match(quoted.clone()))
            .unwrap();
        assert!(hit.is_some());

        assert!(matches!(
            store.get_blob("c", "k", &GetOptions::new().if_none_match(quoted)),
            Err(Error::NotModified(_))
        ));
        assert!(matches!(
            store.get_blob("c", "k", &GetOptions::new().if_match("deadbeef")),
            Err(Error::PreconditionFailed(_))
        ));

        let later = Utc::now() + Duration::hours(1);
        assert!(matches!(
            store.get_blob("c", "k", &GetOptions::new().if_modified_since(later)),
            Err(Error::NotModified(_))
        ));
    }

    #[test]
    fn test_ranged_get_keeps_etag() {
        let store = store_with("c");
        let etag = store.put_blob("c", Blob::new("k", "0123456789")).unwrap();

        let options = GetOptions::new().range(0, 2).range(7, 20);
        let blob = store.get_blob("c", "k", &options).unwrap().unwrap();
        assert_eq!(&blob.payload[..], b"012789");
        assert_eq!(blob.metadata.content.content_length, 6);
        assert_eq!(blob.etag(), etag);

        assert!(matches!(
            store.get_blob("c", "k", &GetOptions::new().start_at(10)),
            Err(Error::IllegalRange(_))
        ));
    }

    #[test]
    fn test_put_overwrites() {
        let store = store_with("c");
        store.put_blob("c", Blob::new("k", "one")).unwrap();
        let second = store.put_blob("c", Blob::new("k", "two")).unwrap();

        let md = store.blob_metadata("c", "k").unwrap();
        assert_eq!(md.etag, second);
        assert_eq!(md.size(), 3);
        assert_eq!(store.list("c", &ListOptions::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_list_containers() {
        let store = BlobStore::transient();
        store.create_container_in_location("b", Some("eu")).unwrap();
        store.create_container_in_location("a", None).unwrap();

        let page = store.list_containers().unwrap();
        assert_eq!(page.names(), vec!["a", "b"]);
        assert!(page.entries.iter().all(|e| e.kind == StorageType::Container));
        assert_eq!(page.entries[1].location.as_deref(), Some("eu"));
        assert!(!page.is_truncated());
    }

    #[test]
    fn test_directories() {
        let store = store_with("c");
        store.create_directory("c", "photos/").unwrap();
        assert!(store.directory_exists("c", "photos").unwrap());
        assert!(!store.directory_exists("c", "videos").unwrap());

        store.put_blob("c", Blob::new("videos/clip.mp4", "x")).unwrap();
        assert!(store.directory_exists("c", "videos").unwrap());

        let page = store.list("c", &ListOptions::new()).unwrap();
        assert_eq!(page.names(), vec!["photos", "videos"]);
        assert!(page.entries.iter().all(|e| e.kind == StorageType::RelativePath));

        assert!(matches!(
            store.create_directory("c", "/"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_delete_container_if_empty() {
        let store = store_with("c");
        store.put_blob("c", Blob::new("k", "v")).unwrap();
        assert!(!store.delete_container_if_empty("c").unwrap());

        store.clear_container("c").unwrap();
        assert!(store.delete_container_if_empty("c").unwrap());
        assert!(!store.container_exists("c").unwrap());
        assert!(matches!(
            store.clear_container("c"),
            Err(Error::ContainerNotFound(_))
        ));
    }
}
