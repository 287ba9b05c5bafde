//! # localblob
//!
//! A local, S3-style blob store for tests and development.
//!
//! localblob keeps named containers of blobs either in process memory or in a
//! directory tree, and answers reads and listings the way an object store
//! service would: MD5 ETags, conditional reads, byte ranges, and paginated
//! listings that fold `/`-separated names into virtual directories.
//!
//! ## Core Concepts
//!
//! - **Containers**: Named buckets with a location tag
//! - **Blobs**: Payload plus metadata, keyed by name within a container
//! - **Strategies**: Where data lives (transient memory or the filesystem)
//! - **Pages**: Listing results with a marker to continue from
//!
//! ## Example
//!
//! ```
//! use localblob::{Blob, BlobStore, GetOptions, ListOptions};
//!
//! let store = BlobStore::transient();
//! store.create_container_in_location("photos", None)?;
//! let etag = store.put_blob("photos", Blob::new("2024/cat.jpg", "meow"))?;
//!
//! let blob = store.get_blob("photos", "2024/cat.jpg", &GetOptions::default())?;
//! assert_eq!(blob.map(|b| b.etag()), Some(etag));
//!
//! let page = store.list("photos", &ListOptions::new())?;
//! assert_eq!(page.names(), vec!["2024"]);
//! # Ok::<(), localblob::Error>(())
//! ```

pub mod config;
pub mod model;
pub mod ops;
pub mod store;

mod blobstore;
mod error;

pub use blobstore::{BlobStore, DEFAULT_LOCATION};
pub use config::{Backend, StoreConfig};
pub use error::{Error, Result};
pub use model::{
    Blob, BlobMetadata, ContentMetadata, ETag, GetOptions, ListOptions, PageSet,
    StorageMetadata, StorageType,
};
pub use store::{FilesystemStorage, StorageStrategy, TransientStorage};

/// Index format version for compatibility
pub const VERSION: u32 = 2;

/// Magic bytes for index file identification
pub const MAGIC: &[u8; 8] = b"LOCLBLOB";
