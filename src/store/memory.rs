//! In-memory storage strategy
//!
//! Containers live in a concurrent map; each container guards its own blob
//! map, so operations on different containers never contend.

use super::traits::{container_not_found, StorageStrategy};
use crate::model::{Blob, BlobMetadata};
use crate::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

struct Container {
    location: String,
    blobs: RwLock<BTreeMap<String, Blob>>,
}

impl Container {
    fn new(location: &str) -> Self {
        Container {
            location: location.to_string(),
            blobs: RwLock::new(BTreeMap::new()),
        }
    }
}

/// Keeps all containers and blobs in process memory
#[derive(Default)]
pub struct TransientStorage {
    containers: DashMap<String, Arc<Container>>,
}

impl TransientStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn container(&self, name: &str) -> Result<Arc<Container>> {
        self.containers
            .get(name)
            .map(|c| Arc::clone(c.value()))
            .ok_or_else(|| container_not_found(name))
    }
}

impl StorageStrategy for TransientStorage {
    fn kind(&self) -> &'static str {
        "transient"
    }

    fn container_exists(&self, container: &str) -> Result<bool> {
        Ok(self.containers.contains_key(container))
    }

    fn container_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.containers.iter().map(|c| c.key().clone()).collect();
        names.sort();
        Ok(names)
    }

    fn create_container(&self, container: &str, location: &str) -> Result<bool> {
        match self.containers.entry(container.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Container::new(location)));
                Ok(true)
            }
        }
    }

    fn delete_container(&self, container: &str) -> Result<()> {
        self.containers.remove(container);
        Ok(())
    }

    fn delete_container_if_empty(&self, container: &str) -> Result<bool> {
        if self
            .containers
            .remove_if(container, |_, c| c.blobs.read().is_empty())
            .is_some()
        {
            return Ok(true);
        }
        Ok(!self.containers.contains_key(container))
    }

    fn clear_container(&self, container: &str) -> Result<()> {
        self.container(container)?.blobs.write().clear();
        Ok(())
    }

    fn location(&self, container: &str) -> Result<Option<String>> {
        Ok(self
            .containers
            .get(container)
            .map(|c| c.location.clone()))
    }

    fn blob_exists(&self, container: &str, key: &str) -> Result<bool> {
        Ok(self.container(container)?.blobs.read().contains_key(key))
    }

    fn put_blob(&self, container: &str, blob: Blob) -> Result<()> {
        let target = self.container(container)?;
        trace!(container, key = blob.name(), size = blob.size(), "storing blob in memory");
        target.blobs.write().insert(blob.name().to_string(), blob);
        Ok(())
    }

    fn get_blob(&self, container: &str, key: &str) -> Result<Option<Blob>> {
        Ok(self.container(container)?.blobs.read().get(key).cloned())
    }

    fn blob_metadata(&self, container: &str, key: &str) -> Result<Option<BlobMetadata>> {
        Ok(self
            .container(container)?
            .blobs
            .read()
            .get(key)
            .map(|b| b.metadata.clone()))
    }

    fn remove_blob(&self, container: &str, key: &str) -> Result<()> {
        if let Ok(target) = self.container(container) {
            target.blobs.write().remove(key);
        }
        Ok(())
    }

    fn list_metadata(&self, container: &str) -> Result<Vec<BlobMetadata>> {
        let target = self.container(container)?;
        let blobs = target.blobs.read();
        Ok(blobs.values().map(|b| b.metadata.clone()).collect())
    }

    fn blob_count(&self, container: &str) -> Result<usize> {
        Ok(self.container(container)?.blobs.read().len())
    }

    fn blob_uri(&self, container: &str, key: &str) -> Result<String> {
        let location = self.container(container)?.location.clone();
        Ok(format!("transient://{}/{}/{}", location, container, key))
    }
}
