//! Storage strategies
//!
//! A [`StorageStrategy`] owns the physical side of the store: where containers
//! live and how blob payloads and metadata are kept. Listing, preconditions and
//! ranges are applied on top by [`BlobStore`](crate::BlobStore), so every
//! strategy behaves the same from the outside.

mod filesystem;
mod memory;
mod traits;
pub mod validate;

pub use filesystem::FilesystemStorage;
pub use memory::TransientStorage;
pub use traits::StorageStrategy;
