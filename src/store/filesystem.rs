//! Disk-backed storage strategy
//!
//! Layout:
//! ```text
//! <base>/
//!   <container>/          one directory per container
//!     <key>               one file per blob; `/` in a key nests directories
//!   .localblob/
//!     <container>.idx     metadata index of the container
//! ```
//!
//! Index file format:
//! ```text
//! [HEADER: 12 bytes]
//!   - magic: 8 bytes ("LOCLBLOB")
//!   - version: 4 bytes (u32 LE)
//!
//! [BODY: variable]
//!   - bincode: location, then key → (blob metadata, file size, file mtime)
//! ```
//!
//! Payload files are the source of truth for which blobs exist. Files that
//! appear without an index entry, or whose size or mtime no longer matches
//! it, get their metadata recomputed from the file itself.
//!
//! Payloads are staged under `.localblob/` and renamed over the key's path,
//! so a failed write leaves the previous blob in place.

use super::traits::{container_not_found, StorageStrategy};
use super::validate::{validate_blob_key, validate_container_name};
use crate::model::{Blob, BlobMetadata, ETag};
use crate::{Error, Result, DEFAULT_LOCATION, MAGIC, VERSION};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

const INDEX_DIR: &str = ".localblob";
const HEADER_SIZE: usize = 12;

/// Persistent per-container state
#[derive(Debug, Default, Serialize, Deserialize)]
struct ContainerIndex {
    location: String,
    entries: BTreeMap<String, IndexEntry>,
}

/// Stored metadata plus the file state it was recorded against
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    metadata: BlobMetadata,
    len: u64,
    modified: Option<SystemTime>,
}

impl IndexEntry {
    fn new(metadata: BlobMetadata, file: &fs::Metadata) -> Self {
        IndexEntry {
            metadata,
            len: file.len(),
            modified: file.modified().ok(),
        }
    }

    fn describes(&self, file: &fs::Metadata) -> bool {
        self.len == file.len() && self.modified == file.modified().ok()
    }
}

/// A container's lock; every file operation on the container holds it
struct FsContainer {
    removed: AtomicBool,
    index: Mutex<ContainerIndex>,
}

impl FsContainer {
    fn new(index: ContainerIndex) -> Self {
        FsContainer {
            removed: AtomicBool::new(false),
            index: Mutex::new(index),
        }
    }

    fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }
}

/// Stores each container as a directory below a base directory
pub struct FilesystemStorage {
    base_dir: PathBuf,
    containers: DashMap<String, Arc<FsContainer>>,
}

impl FilesystemStorage {
    /// Open (creating if needed) a store rooted at `base_dir`
    pub fn open(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir.join(INDEX_DIR))?;
        let base_dir = fs::canonicalize(base_dir)?;
        debug!(path = ?base_dir, "Opened filesystem blob storage");

        Ok(FilesystemStorage {
            base_dir,
            containers: DashMap::new(),
        })
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn container_dir(&self, container: &str) -> PathBuf {
        self.base_dir.join(container)
    }

    fn index_path(&self, container: &str) -> PathBuf {
        self.base_dir
            .join(INDEX_DIR)
            .join(format!("{}.idx", container))
    }

    /// Scratch file a payload is written to before it is renamed into place
    fn staging_path(&self, container: &str) -> PathBuf {
        self.base_dir
            .join(INDEX_DIR)
            .join(format!("{}.put.tmp", container))
    }

    fn blob_path(&self, container: &str, key: &str) -> PathBuf {
        key.split('/')
            .fold(self.container_dir(container), |path, segment| path.join(segment))
    }

    /// Find a container, loading its index from disk on first use
    fn open_container(&self, container: &str) -> Result<Option<Arc<FsContainer>>> {
        validate_container_name(container)?;

        if let Some(existing) = self.containers.get(container) {
            return Ok(Some(Arc::clone(existing.value())));
        }

        // the directory check runs under the map slot, so a container deleted
        // in between is never cached again
        match self.containers.entry(container.to_string()) {
            Entry::Occupied(slot) => Ok(Some(Arc::clone(slot.get()))),
            Entry::Vacant(slot) => {
                if !self.container_dir(container).is_dir() {
                    return Ok(None);
                }
                let opened = Arc::new(FsContainer::new(self.load_index(container)?));
                slot.insert(Arc::clone(&opened));
                Ok(Some(opened))
            }
        }
    }

    fn container(&self, container: &str) -> Result<Arc<FsContainer>> {
        self.open_container(container)?
            .ok_or_else(|| container_not_found(container))
    }

    fn init_container(&self, container: &str, location: &str) -> Result<Arc<FsContainer>> {
        fs::create_dir_all(self.container_dir(container))?;
        let index = ContainerIndex {
            location: location.to_string(),
            entries: BTreeMap::new(),
        };
        self.save_index(container, &index)?;
        Ok(Arc::new(FsContainer::new(index)))
    }

    fn load_index(&self, container: &str) -> Result<ContainerIndex> {
        let path = self.index_path(container);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(container, "No index for container, rebuilding from files");
                return Ok(ContainerIndex {
                    location: DEFAULT_LOCATION.to_string(),
                    entries: BTreeMap::new(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if data.len() < HEADER_SIZE || &data[0..8] != MAGIC {
            return Err(Error::InvalidFile(format!(
                "{}: invalid magic bytes",
                path.display()
            )));
        }

        let mut version_bytes = [0u8; 4];
        version_bytes.copy_from_slice(&data[8..12]);
        let version = u32::from_le_bytes(version_bytes);
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        Ok(bincode::deserialize(&data[HEADER_SIZE..])?)
    }

    /// Write the index to a temporary file and move it into place
    fn save_index(&self, container: &str, index: &ContainerIndex) -> Result<()> {
        let mut data = Vec::with_capacity(HEADER_SIZE + 64 * index.entries.len());
        data.extend_from_slice(MAGIC);
        data.extend_from_slice(&VERSION.to_le_bytes());
        data.extend(bincode::serialize(index)?);

        let path = self.index_path(container);
        let tmp = path.with_extension("idx.tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Metadata for the file at `path`, recomputed when the index lacks it
    fn current_metadata(
        &self,
        index: &mut ContainerIndex,
        container: &str,
        key: &str,
        path: &Path,
    ) -> Result<BlobMetadata> {
        let file = fs::metadata(path)?;
        match index.entries.get(key) {
            Some(entry) if entry.describes(&file) => return Ok(entry.metadata.clone()),
            Some(_) => warn!(container, key, "Blob changed on disk, recomputing metadata"),
            None => debug!(container, key, "Blob has no index entry, computing metadata"),
        }

        let md = synthesize_metadata(container, key, path, &file)?;
        index
            .entries
            .insert(key.to_string(), IndexEntry::new(md.clone(), &file));
        Ok(md)
    }
}

fn synthesize_metadata(
    container: &str,
    key: &str,
    path: &Path,
    file_meta: &fs::Metadata,
) -> Result<BlobMetadata> {
    let etag = ETag::digest_reader(File::open(path)?)?;

    let mut md = BlobMetadata::new(key);
    md.etag = etag;
    md.content.content_md5 = Some(*etag.as_bytes());
    md.content.content_length = file_meta.len();
    md.last_modified = file_meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    md.container = Some(container.to_string());
    md.uri = Some(format!("file://{}", path.display()));
    Ok(md)
}

fn ignore_not_found(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Collect `/`-separated keys of every file below `dir`
fn collect_keys(root: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            collect_keys(root, &path, keys)?;
        } else if file_type.is_file() {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            let segments: Option<Vec<&str>> = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect();
            match segments {
                Some(segments) => keys.push(segments.join("/")),
                None => warn!(path = ?path, "Skipping file with non UTF-8 name"),
            }
        }
    }
    Ok(())
}

/// Remove empty directories between `path` and `root`
fn prune_empty_parents(root: &Path, path: &Path) {
    let mut dir = path.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        if fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

impl StorageStrategy for FilesystemStorage {
    fn kind(&self) -> &'static str {
        "filesystem"
    }

    fn container_exists(&self, container: &str) -> Result<bool> {
        if validate_container_name(container).is_err() {
            return Ok(false);
        }
        Ok(self
            .open_container(container)?
            .is_some_and(|c| !c.is_removed()))
    }

    fn container_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_container(&self, container: &str, location: &str) -> Result<bool> {
        validate_container_name(container)?;

        match self.containers.entry(container.to_string()) {
            Entry::Occupied(mut slot) => {
                if !slot.get().is_removed() {
                    return Ok(false);
                }
                let created = self.init_container(container, location)?;
                slot.insert(created);
            }
            Entry::Vacant(slot) => {
                if self.container_dir(container).is_dir() {
                    let index = self.load_index(container)?;
                    slot.insert(Arc::new(FsContainer::new(index)));
                    return Ok(false);
                }
                let created = self.init_container(container, location)?;
                slot.insert(created);
            }
        }

        debug!(container, location, "Created container directory");
        Ok(true)
    }

    fn delete_container(&self, container: &str) -> Result<()> {
        if validate_container_name(container).is_err() {
            return Ok(());
        }
        let Some(target) = self.open_container(container)? else {
            return Ok(());
        };

        {
            let _index = target.index.lock();
            if !target.is_removed() {
                ignore_not_found(fs::remove_dir_all(self.container_dir(container)))?;
                ignore_not_found(fs::remove_file(self.index_path(container)))?;
                target.removed.store(true, Ordering::Release);
            }
        }

        self.containers
            .remove_if(container, |_, current| Arc::ptr_eq(current, &target));
        debug!(container, "Deleted container directory");
        Ok(())
    }

    fn clear_container(&self, container: &str) -> Result<()> {
        let target = self.container(container)?;
        let mut index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }

        for entry in fs::read_dir(self.container_dir(container))? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }

        index.entries.clear();
        self.save_index(container, &index)
    }

    fn location(&self, container: &str) -> Result<Option<String>> {
        let Some(target) = self.open_container(container)? else {
            return Ok(None);
        };
        let index = target.index.lock();
        if target.is_removed() {
            return Ok(None);
        }
        Ok(Some(index.location.clone()))
    }

    fn blob_exists(&self, container: &str, key: &str) -> Result<bool> {
        validate_blob_key(key)?;
        let target = self.container(container)?;
        let _index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }
        Ok(self.blob_path(container, key).is_file())
    }

    fn put_blob(&self, container: &str, blob: Blob) -> Result<()> {
        let key = blob.name().to_string();
        validate_blob_key(&key)?;

        let target = self.container(container)?;
        let mut index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }

        let path = self.blob_path(container, &key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staged = self.staging_path(container);
        let written = fs::write(&staged, &blob.payload).and_then(|()| fs::rename(&staged, &path));
        if let Err(e) = written {
            if let Err(cleanup) = ignore_not_found(fs::remove_file(&staged)) {
                debug!(path = ?staged, error = %cleanup, "Could not delete staged payload");
            }
            return Err(e.into());
        }

        let file = fs::metadata(&path)?;
        index
            .entries
            .insert(key, IndexEntry::new(blob.metadata, &file));
        self.save_index(container, &index)
    }

    fn get_blob(&self, container: &str, key: &str) -> Result<Option<Blob>> {
        validate_blob_key(key)?;
        let target = self.container(container)?;
        let mut index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }

        let path = self.blob_path(container, key);
        if !path.is_file() {
            return Ok(None);
        }

        let payload = Bytes::from(fs::read(&path)?);
        let metadata = self.current_metadata(&mut index, container, key, &path)?;
        Ok(Some(Blob { metadata, payload }))
    }

    fn blob_metadata(&self, container: &str, key: &str) -> Result<Option<BlobMetadata>> {
        validate_blob_key(key)?;
        let target = self.container(container)?;
        let mut index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }

        let path = self.blob_path(container, key);
        if !path.is_file() {
            return Ok(None);
        }
        self.current_metadata(&mut index, container, key, &path)
            .map(Some)
    }

    fn remove_blob(&self, container: &str, key: &str) -> Result<()> {
        validate_blob_key(key)?;
        let Some(target) = self.open_container(container)? else {
            return Ok(());
        };
        let mut index = target.index.lock();
        if target.is_removed() {
            return Ok(());
        }

        let path = self.blob_path(container, key);
        if path.is_file() {
            ignore_not_found(fs::remove_file(&path))?;
            prune_empty_parents(&self.container_dir(container), &path);
        }

        if index.entries.remove(key).is_some() {
            self.save_index(container, &index)?;
        }
        Ok(())
    }

    fn list_metadata(&self, container: &str) -> Result<Vec<BlobMetadata>> {
        let target = self.container(container)?;
        let mut index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }

        let root = self.container_dir(container);
        let mut keys = Vec::new();
        collect_keys(&root, &root, &mut keys)?;

        keys.into_iter()
            .map(|key| {
                let path = self.blob_path(container, &key);
                self.current_metadata(&mut index, container, &key, &path)
            })
            .collect()
    }

    fn blob_count(&self, container: &str) -> Result<usize> {
        let target = self.container(container)?;
        let _index = target.index.lock();
        if target.is_removed() {
            return Err(container_not_found(container));
        }

        let root = self.container_dir(container);
        let mut keys = Vec::new();
        collect_keys(&root, &root, &mut keys)?;
        Ok(keys.len())
    }

    fn blob_uri(&self, container: &str, key: &str) -> Result<String> {
        validate_container_name(container)?;
        validate_blob_key(key)?;
        Ok(format!("file://{}", self.blob_path(container, key).display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::stamp;
    use tempfile::tempdir;

    fn stamped(container: &str, name: &str, data: &'static [u8]) -> Blob {
        stamp(Blob::new(name, data), container, String::new)
    }

    #[test]
    fn test_create_and_reopen() {
        let dir = tempdir().unwrap();

        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            assert!(store.create_container("c1", "eu-west").unwrap());
            assert!(!store.create_container("c1", "elsewhere").unwrap());
        }

        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            assert!(store.container_exists("c1").unwrap());
            assert_eq!(store.location("c1").unwrap().as_deref(), Some("eu-west"));
            assert_eq!(store.container_names().unwrap(), vec!["c1"]);
        }
    }

    #[test]
    fn test_blob_persistence() {
        let dir = tempdir().unwrap();
        let blob = stamped("c", "docs/readme.md", b"# hi")
            .with_content_type("text/markdown");
        let etag = blob.etag();

        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            store.create_container("c", DEFAULT_LOCATION).unwrap();
            store.put_blob("c", blob).unwrap();
            assert!(dir.path().join("c").join("docs").join("readme.md").is_file());
        }

        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            let restored = store.get_blob("c", "docs/readme.md").unwrap().unwrap();
            assert_eq!(&restored.payload[..], b"# hi");
            assert_eq!(restored.etag(), etag);
            assert_eq!(restored.content_type(), "text/markdown");
        }
    }

    #[test]
    fn test_external_file_gets_metadata() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        store.create_container("c", DEFAULT_LOCATION).unwrap();
        fs::write(dir.path().join("c").join("dropped.bin"), b"hello").unwrap();

        let md = store.blob_metadata("c", "dropped.bin").unwrap().unwrap();
        assert_eq!(md.etag.to_hex(), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(md.size(), 5);

        let listed = store.list_metadata("c").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "dropped.bin");
    }

    #[test]
    fn test_remove_prunes_empty_directories() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        store.create_container("c", DEFAULT_LOCATION).unwrap();
        store.put_blob("c", stamped("c", "a/b/c.txt", b"x")).unwrap();
        store.put_blob("c", stamped("c", "a/keep.txt", b"y")).unwrap();

        store.remove_blob("c", "a/b/c.txt").unwrap();
        assert!(!dir.path().join("c").join("a").join("b").exists());
        assert!(dir.path().join("c").join("a").is_dir());

        store.remove_blob("c", "a/keep.txt").unwrap();
        assert!(!dir.path().join("c").join("a").exists());
        assert!(dir.path().join("c").is_dir());

        // removing again is a no-op
        store.remove_blob("c", "a/keep.txt").unwrap();
    }

    #[test]
    fn test_delete_then_recreate() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        store.create_container("c", "one").unwrap();
        store.put_blob("c", stamped("c", "k", b"v")).unwrap();

        store.delete_container("c").unwrap();
        assert!(!store.container_exists("c").unwrap());
        assert!(!dir.path().join("c").exists());
        assert!(matches!(
            store.get_blob("c", "k"),
            Err(Error::ContainerNotFound(_))
        ));

        assert!(store.create_container("c", "two").unwrap());
        assert_eq!(store.location("c").unwrap().as_deref(), Some("two"));
        assert!(store.get_blob("c", "k").unwrap().is_none());
    }

    #[test]
    fn test_clear_container() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        store.create_container("c", "loc").unwrap();
        store.put_blob("c", stamped("c", "x/y", b"1")).unwrap();
        store.put_blob("c", stamped("c", "z", b"2")).unwrap();

        store.clear_container("c").unwrap();
        assert_eq!(store.blob_count("c").unwrap(), 0);
        assert_eq!(store.location("c").unwrap().as_deref(), Some("loc"));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        assert!(matches!(
            store.create_container("../escape", "x"),
            Err(Error::InvalidName(_))
        ));

        store.create_container("c", "x").unwrap();
        assert!(matches!(
            store.put_blob("c", stamped("c", "../../etc/passwd", b"")),
            Err(Error::InvalidName(_))
        ));
    }

    #[test]
    fn test_invalid_names_are_absent() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();

        assert!(!store.container_exists("../escape").unwrap());
        assert!(!store.container_exists("a/b").unwrap());
        store.delete_container("../escape").unwrap();
        store.delete_container("a/b").unwrap();
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_stale_index_entry_is_recomputed() {
        let dir = tempdir().unwrap();
        let index_path = dir.path().join(INDEX_DIR).join("c.idx");

        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            store.create_container("c", DEFAULT_LOCATION).unwrap();
            store.put_blob("c", stamped("c", "k", b"hello")).unwrap();
        }
        let old_index = fs::read(&index_path).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            store.put_blob("c", stamped("c", "k", b"world")).unwrap();
        }
        // same size, older index: only the mtime tells the entries apart
        fs::write(&index_path, old_index).unwrap();

        let store = FilesystemStorage::open(dir.path()).unwrap();
        let blob = store.get_blob("c", "k").unwrap().unwrap();
        assert_eq!(&blob.payload[..], b"world");
        assert_eq!(blob.etag(), ETag::digest(b"world"));
    }

    #[test]
    fn test_failed_put_keeps_previous_blob() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        store.create_container("c", DEFAULT_LOCATION).unwrap();
        store.put_blob("c", stamped("c", "photos/a.jpg", b"cat")).unwrap();

        // "photos" is a directory, so the payload cannot be moved over it
        assert!(store.put_blob("c", stamped("c", "photos", b"dog")).is_err());

        let kept = store.get_blob("c", "photos/a.jpg").unwrap().unwrap();
        assert_eq!(&kept.payload[..], b"cat");
        assert!(!store.staging_path("c").exists());
        assert_eq!(store.blob_count("c").unwrap(), 1);
    }

    #[test]
    fn test_overwrite_replaces_payload_in_place() {
        let dir = tempdir().unwrap();
        let store = FilesystemStorage::open(dir.path()).unwrap();
        store.create_container("c", DEFAULT_LOCATION).unwrap();
        store.put_blob("c", stamped("c", "k", b"first")).unwrap();
        store.put_blob("c", stamped("c", "k", b"second!")).unwrap();

        let blob = store.get_blob("c", "k").unwrap().unwrap();
        assert_eq!(&blob.payload[..], b"second!");
        assert_eq!(blob.etag(), ETag::digest(b"second!"));
        assert_eq!(store.list_metadata("c").unwrap().len(), 1);
    }

    #[test]
    fn test_readers_never_revive_deleted_container() {
        let dir = tempdir().unwrap();
        let store = Arc::new(FilesystemStorage::open(dir.path()).unwrap());
        store.create_container("c", DEFAULT_LOCATION).unwrap();
        store.put_blob("c", stamped("c", "k", b"v")).unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(5));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..200 {
                        store.container_exists("c").unwrap();
                    }
                })
            })
            .collect();

        barrier.wait();
        store.delete_container("c").unwrap();
        for reader in readers {
            reader.join().unwrap();
        }

        assert!(!store.container_exists("c").unwrap());
        assert!(store.containers.get("c").is_none());
        assert!(store.create_container("c", "fresh").unwrap());
        assert_eq!(store.location("c").unwrap().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_corrupt_index_detected() {
        let dir = tempdir().unwrap();
        {
            let store = FilesystemStorage::open(dir.path()).unwrap();
            store.create_container("c", "x").unwrap();
        }
        fs::write(dir.path().join(INDEX_DIR).join("c.idx"), b"garbage!garbage!").unwrap();

        let store = FilesystemStorage::open(dir.path()).unwrap();
        assert!(matches!(
            store.container_exists("c"),
            Err(Error::InvalidFile(_))
        ));
    }
}
