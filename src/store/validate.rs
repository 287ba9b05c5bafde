//! Name rules for containers and blob keys stored on disk

use crate::{Error, Result};

/// Container names become directory names directly under the base directory.
/// Names starting with `.` are reserved for the store's own files.
pub fn validate_container_name(name: &str) -> Result<()> {
    let invalid = |why: &str| -> Result<()> {
        Err(Error::InvalidName(format!("container {:?}: {}", name, why)))
    };

    if name.is_empty() {
        return invalid("empty");
    }
    if name.starts_with('.') {
        return invalid("must not start with '.'");
    }
    if name.contains(['/', '\\', '\0']) {
        return invalid("must not contain path separators");
    }
    Ok(())
}

/// Blob keys map to relative paths; `/` separates directories.
pub fn validate_blob_key(key: &str) -> Result<()> {
    let invalid = |why: &str| -> Result<()> {
        Err(Error::InvalidName(format!("key {:?}: {}", key, why)))
    };

    if key.is_empty() {
        return invalid("empty");
    }
    if key.starts_with('/') || key.ends_with('/') {
        return invalid("must not start or end with '/'");
    }
    if key.contains(['\\', '\0']) {
        return invalid("must not contain '\\' or NUL");
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return invalid("empty, '.' or '..' path segment");
    }
    Ok(())
}
