//! Listing and pagination over a container's flat namespace
//!
//! A page is produced from a snapshot of blob metadata:
//! 1. materialize entries (directory placeholders become relative paths)
//! 2. keep names under `prefix` (but not equal to it)
//! 3. keep names strictly after `marker`
//! 4. sort by name, keeping one entry per name (a blob wins over a
//!    directory placeholder of the same name)
//! 5. truncate to `max_results`, remembering the last name as the next marker
//! 6. unless recursive, fold names below a `/` into one relative path per
//!    distinct first segment
//!
//! Folding runs after truncation, so folding never pulls in entries from
//! beyond the page.

use crate::model::{BlobMetadata, ListOptions, PageSet, StorageMetadata, StorageType};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Delimiter used to emulate directories
pub const DELIMITER: char = '/';

/// Build one page of a listing from the container's blob metadata
pub fn list_page<I>(blobs: I, options: &ListOptions) -> Result<PageSet>
where
    I: IntoIterator<Item = BlobMetadata>,
{
    if options.max_results == 0 {
        return Err(Error::InvalidArgument(
            "max_results must be at least 1".into(),
        ));
    }

    let prefix = options.prefix.as_deref().filter(|p| !p.is_empty());
    let marker = options.marker.as_deref();

    let mut entries: Vec<StorageMetadata> = blobs
        .into_iter()
        .map(|md| materialize(&md, options.detailed))
        .filter(|entry| match prefix {
            Some(p) => entry.name.starts_with(p) && entry.name != p,
            None => true,
        })
        .filter(|entry| match marker {
            Some(m) => entry.name.as_str() > m,
            None => true,
        })
        .collect();

    sort_entries(&mut entries);
    // a page must never end between two entries of the same name
    entries.dedup_by(|later, earlier| later.name == earlier.name);

    let next_marker = if entries.len() > options.max_results {
        entries.truncate(options.max_results);
        entries.last().map(|e| e.name.clone())
    } else {
        None
    };

    if !options.recursive {
        entries = fold(entries, prefix);
    }

    Ok(PageSet::new(entries, next_marker))
}

/// Turn stored metadata into a listing entry
fn materialize(md: &BlobMetadata, detailed: bool) -> StorageMetadata {
    if let Some(dir) = md.directory_name() {
        return StorageMetadata::relative_path(dir);
    }
    let mut entry = StorageMetadata::from(md);
    if !detailed {
        entry.user_metadata.clear();
    }
    entry
}

/// Name order, with a blob sorting before a relative path of the same name
fn sort_entries(entries: &mut [StorageMetadata]) {
    entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
}

/// The part of `name` below `prefix`, treating the prefix as a directory
pub fn remainder<'a>(name: &'a str, prefix: Option<&str>) -> &'a str {
    let Some(prefix) = prefix else {
        return name;
    };
    let Some(rest) = name.strip_prefix(prefix) else {
        return name;
    };
    if prefix.ends_with(DELIMITER) {
        rest
    } else {
        rest.strip_prefix(DELIMITER).unwrap_or(rest)
    }
}

/// First path segment of `name` below `prefix`, if the name is nested deeper
pub fn common_prefix<'a>(name: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    let rest = remainder(name, prefix);
    rest.find(DELIMITER).map(|idx| &rest[..idx])
}

fn fold(entries: Vec<StorageMetadata>, prefix: Option<&str>) -> Vec<StorageMetadata> {
    let mut directories = BTreeSet::new();
    let mut folded = Vec::with_capacity(entries.len());

    for entry in entries {
        match common_prefix(&entry.name, prefix) {
            Some(segment) => {
                directories.insert(segment.to_string());
            }
            None => folded.push(entry),
        }
    }

    folded.extend(directories.into_iter().map(StorageMetadata::relative_path));
    sort_entries(&mut folded);
    folded.dedup_by(|a, b| a.name == b.name && a.kind == b.kind);
    folded
}
