//! Byte-range extraction
//!
//! Ranges use the HTTP closed-interval syntax: `start-end`, `start-` (to the
//! end of the data) and `-suffix` (the last `suffix` bytes). Several
//! specifiers are concatenated in request order; no multipart framing is
//! produced.

use crate::{Error, Result};
use bytes::{Bytes, BytesMut};

/// A parsed range specifier, not yet resolved against a payload size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteRange {
    /// `start-end`, both inclusive
    Bounded { start: u64, end: u64 },
    /// `start-`
    From { start: u64 },
    /// `-length`
    Suffix { length: u64 },
}

impl ByteRange {
    /// Parse one specifier
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let illegal = || Error::IllegalRange(spec.to_string());

        if let Some(length) = spec.strip_prefix('-') {
            let length = length.trim().parse::<u64>().map_err(|_| illegal())?;
            return Ok(ByteRange::Suffix { length });
        }

        let (start, end) = spec.split_once('-').ok_or_else(illegal)?;
        let start = start.trim().parse::<u64>().map_err(|_| illegal())?;
        let end = end.trim();
        if end.is_empty() {
            return Ok(ByteRange::From { start });
        }

        let end = end.parse::<u64>().map_err(|_| illegal())?;
        if start > end {
            return Err(illegal());
        }
        Ok(ByteRange::Bounded { start, end })
    }

    /// Resolve to an inclusive `(offset, last)` pair within `size` bytes
    pub fn resolve(&self, size: u64) -> Result<(u64, u64)> {
        let last_byte = size
            .checked_sub(1)
            .ok_or_else(|| Error::IllegalRange(format!("{} on empty payload", self)))?;

        let (offset, last) = match *self {
            ByteRange::Bounded { start, end } => (start, end.min(last_byte)),
            ByteRange::From { start } => (start, last_byte),
            ByteRange::Suffix { length } => (size.saturating_sub(length), last_byte),
        };

        if offset > last {
            return Err(Error::IllegalRange(format!(
                "{} outside payload of {} bytes",
                self, size
            )));
        }
        Ok((offset, last))
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ByteRange::Bounded { start, end } => write!(f, "{}-{}", start, end),
            ByteRange::From { start } => write!(f, "{}-", start),
            ByteRange::Suffix { length } => write!(f, "-{}", length),
        }
    }
}

/// Parse a list of specifiers; each may carry a `bytes=` prefix and hold
/// several comma-separated ranges
pub fn parse_ranges<S: AsRef<str>>(specs: &[S]) -> Result<Vec<ByteRange>> {
    let mut ranges = Vec::new();
    for spec in specs {
        let spec = spec.as_ref().trim();
        let spec = spec.strip_prefix("bytes=").unwrap_or(spec);
        for part in spec.split(',') {
            ranges.push(ByteRange::parse(part)?);
        }
    }
    Ok(ranges)
}

/// Extract and concatenate the requested ranges of `data`
pub fn extract(data: &Bytes, ranges: &[ByteRange]) -> Result<Bytes> {
    let size = data.len() as u64;

    if let [single] = ranges {
        let (offset, last) = single.resolve(size)?;
        return Ok(data.slice(offset as usize..=last as usize));
    }

    let mut out = BytesMut::new();
    for range in ranges {
        let (offset, last) = range.resolve(size)?;
        out.extend_from_slice(&data[offset as usize..=last as usize]);
    }
    Ok(out.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_bytes() -> Bytes {
        Bytes::from_static(b"0123456789")
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            ByteRange::parse("0-4").unwrap(),
            ByteRange::Bounded { start: 0, end: 4 }
        );
        assert_eq!(ByteRange::parse("5-").unwrap(), ByteRange::From { start: 5 });
        assert_eq!(
            ByteRange::parse("-3").unwrap(),
            ByteRange::Suffix { length: 3 }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "4", "5-3", "x-2", "1-y", "--2"] {
            assert!(
                matches!(ByteRange::parse(bad), Err(Error::IllegalRange(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_first_five_bytes() {
        let ranges = parse_ranges(&["0-4"]).unwrap();
        assert_eq!(&extract(&ten_bytes(), &ranges).unwrap()[..], b"01234");
    }

    #[test]
    fn test_open_ended_and_suffix() {
        let ranges = parse_ranges(&["7-"]).unwrap();
        assert_eq!(&extract(&ten_bytes(), &ranges).unwrap()[..], b"789");

        let ranges = parse_ranges(&["-2"]).unwrap();
        assert_eq!(&extract(&ten_bytes(), &ranges).unwrap()[..], b"89");
    }

    #[test]
    fn test_end_is_clamped() {
        let ranges = parse_ranges(&["6-100"]).unwrap();
        assert_eq!(&extract(&ten_bytes(), &ranges).unwrap()[..], b"6789");
    }

    #[test]
    fn test_suffix_longer_than_payload() {
        let ranges = parse_ranges(&["-50"]).unwrap();
        assert_eq!(&extract(&ten_bytes(), &ranges).unwrap()[..], b"0123456789");
    }

    #[test]
    fn test_multiple_ranges_concatenate_in_order() {
        let ranges = parse_ranges(&["8-9", "0-1", "bytes=4-4,-1"]).unwrap();
        assert_eq!(&extract(&ten_bytes(), &ranges).unwrap()[..], b"890149");
    }

    #[test]
    fn test_start_past_end_is_illegal() {
        let ranges = parse_ranges(&["20-30"]).unwrap();
        assert!(matches!(
            extract(&ten_bytes(), &ranges),
            Err(Error::IllegalRange(_))
        ));

        let ranges = parse_ranges(&["-0"]).unwrap();
        assert!(extract(&ten_bytes(), &ranges).is_err());
    }

    #[test]
    fn test_empty_payload_rejects_ranges() {
        let ranges = parse_ranges(&["0-"]).unwrap();
        assert!(extract(&Bytes::new(), &ranges).is_err());
    }
}
