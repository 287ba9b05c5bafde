//! Core data model types for localblob

mod blob;
mod etag;
mod metadata;
mod options;
mod page;

pub use blob::Blob;
pub use etag::ETag;
pub use metadata::{
    BlobMetadata, ContentMetadata, StorageMetadata, StorageType, DEFAULT_CONTENT_TYPE,
    DIRECTORY_CONTENT_TYPE, DIRECTORY_SUFFIX,
};
pub use options::{GetOptions, ListOptions, DEFAULT_MAX_RESULTS};
pub use page::PageSet;
