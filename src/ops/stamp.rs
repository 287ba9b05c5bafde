//! Metadata stamping applied to every write

use crate::model::{Blob, ETag, DEFAULT_CONTENT_TYPE};
use chrono::Utc;

/// Prepare a blob for storage in `container`.
///
/// Computes the ETag over the full payload, records it as the content MD5,
/// sets the content length and last-modified time, lowercases user metadata
/// keys and fills in the URI from `default_uri` when the caller left it unset.
pub fn stamp(mut blob: Blob, container: &str, default_uri: impl FnOnce() -> String) -> Blob {
    let etag = ETag::digest(&blob.payload);
    let md = &mut blob.metadata;

    md.etag = etag;
    md.content.content_md5 = Some(*etag.as_bytes());
    md.content.content_length = blob.payload.len() as u64;
    if md.content.content_type.is_empty() {
        md.content.content_type = DEFAULT_CONTENT_TYPE.to_string();
    }
    md.last_modified = Utc::now();
    md.container = Some(container.to_string());

    if md.user_metadata.keys().any(|k| k.chars().any(char::is_uppercase)) {
        md.user_metadata = std::mem::take(&mut md.user_metadata)
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
    }

    if md.uri.is_none() {
        md.uri = Some(default_uri());
    }

    blob
}
