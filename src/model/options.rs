//! Request options for listing and reading blobs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size used when none is requested
pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Options controlling a container listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Exclusive lower bound: only names strictly greater are returned
    pub marker: Option<String>,
    pub prefix: Option<String>,
    pub max_results: usize,
    /// When false, names below the first `/` are folded into virtual directories
    pub recursive: bool,
    /// When false, user metadata is stripped from entries
    pub detailed: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            marker: None,
            prefix: None,
            max_results: DEFAULT_MAX_RESULTS,
            recursive: false,
            detailed: false,
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn detailed(mut self) -> Self {
        self.detailed = true;
        self
    }

    /// Continue from a previous page's marker, or clear it
    pub fn after(mut self, marker: Option<String>) -> Self {
        self.marker = marker;
        self
    }
}

/// Preconditions and byte ranges for a read
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOptions {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<DateTime<Utc>>,
    pub if_unmodified_since: Option<DateTime<Utc>>,
    /// Textual specifiers: `start-end`, `start-` or `-suffix`
    pub ranges: Vec<String>,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn if_match(mut self, etag: impl Into<String>) -> Self {
        self.if_match = Some(etag.into());
        self
    }

    pub fn if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }

    pub fn if_modified_since(mut self, since: DateTime<Utc>) -> Self {
        self.if_modified_since = Some(since);
        self
    }

    pub fn if_unmodified_since(mut self, since: DateTime<Utc>) -> Self {
        self.if_unmodified_since = Some(since);
        self
    }

    /// Add a raw range specifier
    pub fn range_spec(mut self, spec: impl Into<String>) -> Self {
        self.ranges.push(spec.into());
        self
    }

    /// Bytes `start..=end`
    pub fn range(self, start: u64, end: u64) -> Self {
        self.range_spec(format!("{}-{}", start, end))
    }

    /// Bytes from `offset` to the end
    pub fn start_at(self, offset: u64) -> Self {
        self.range_spec(format!("{}-", offset))
    }

    /// The last `count` bytes
    pub fn tail(self, count: u64) -> Self {
        self.range_spec(format!("-{}", count))
    }

    pub fn has_preconditions(&self) -> bool {
        self.if_match.is_some()
            || self.if_none_match.is_some()
            || self.if_modified_since.is_some()
            || self.if_unmodified_since.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_options_defaults() {
        let opts = ListOptions::new();
        assert_eq!(opts.max_results, 1000);
        assert!(!opts.recursive);
        assert!(!opts.detailed);
        assert!(opts.marker.is_none());
    }

    #[test]
    fn test_get_options_range_helpers() {
        let opts = GetOptions::new().range(0, 4).start_at(7).tail(3);
        assert_eq!(opts.ranges, vec!["0-4", "7-", "-3"]);
        assert!(!opts.has_preconditions());
        assert!(opts.if_match("x").has_preconditions());
    }
}
