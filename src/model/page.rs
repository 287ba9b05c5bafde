//! A page of listing results

use super::{StorageMetadata, StorageType};
use serde::{Deserialize, Serialize};

/// Ordered listing entries plus the marker to continue from
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSet {
    pub entries: Vec<StorageMetadata>,
    /// Set when the listing was truncated
    pub next_marker: Option<String>,
}

impl PageSet {
    pub fn new(entries: Vec<StorageMetadata>, next_marker: Option<String>) -> Self {
        PageSet {
            entries,
            next_marker,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.next_marker.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Entries of the given kind
    pub fn of_kind(&self, kind: StorageType) -> impl Iterator<Item = &StorageMetadata> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

impl IntoIterator for PageSet {
    type Item = StorageMetadata;
    type IntoIter = std::vec::IntoIter<StorageMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
