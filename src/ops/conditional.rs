//! HTTP-style precondition evaluation for reads

use crate::model::{BlobMetadata, GetOptions};
use crate::{Error, Result};

/// Result of checking a read's preconditions against stored metadata
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Proceed,
    /// 304
    NotModified,
    /// 412
    PreconditionFailed,
}

impl Outcome {
    pub fn http_status(&self) -> u16 {
        match self {
            Outcome::Proceed => 200,
            Outcome::NotModified => 304,
            Outcome::PreconditionFailed => 412,
        }
    }
}

/// Evaluate the preconditions in `options`; the first violated one wins.
pub fn evaluate(options: &GetOptions, metadata: &BlobMetadata) -> Outcome {
    if let Some(if_match) = options.if_match.as_deref() {
        if !metadata.etag.matches(if_match) {
            return Outcome::PreconditionFailed;
        }
    }

    if let Some(if_none_match) = options.if_none_match.as_deref() {
        if metadata.etag.matches(if_none_match) {
            return Outcome::NotModified;
        }
    }

    if let Some(since) = options.if_modified_since {
        if metadata.last_modified <= since {
            return Outcome::NotModified;
        }
    }

    if let Some(since) = options.if_unmodified_since {
        if metadata.last_modified > since {
            return Outcome::PreconditionFailed;
        }
    }

    Outcome::Proceed
}

/// Like [`evaluate`], but turn a non-proceeding outcome into its error
pub fn check(options: &GetOptions, metadata: &BlobMetadata) -> Result<()> {
    match evaluate(options, metadata) {
        Outcome::Proceed => Ok(()),
        Outcome::NotModified => Err(Error::NotModified(format!(
            "{} (etag {}, last modified {})",
            metadata.name,
            metadata.etag,
            metadata.last_modified.to_rfc2822()
        ))),
        Outcome::PreconditionFailed => Err(Error::PreconditionFailed(format!(
            "{} (etag {}, last modified {})",
            metadata.name,
            metadata.etag,
            metadata.last_modified.to_rfc2822()
        ))),
    }
}
