//! Content hash (ETag) type using MD5

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

/// A 16-byte MD5 digest identifying a blob's exact byte content
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ETag([u8; 16]);

impl ETag {
    /// Digest of the empty payload
    pub const EMPTY: ETag = ETag([
        0xd4, 0x1d, 0x8c, 0xd9, 0x8f, 0x00, 0xb2, 0x04, 0xe9, 0x80, 0x09, 0x98, 0xec, 0xf8, 0x42,
        0x7e,
    ]);

    /// Hash arbitrary data
    pub fn digest(data: &[u8]) -> Self {
        let digest = Md5::digest(data);
        let mut out = [0u8; 16];
        out.copy_from_slice(&digest);
        ETag(out)
    }

    /// Hash everything a reader yields
    pub fn digest_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut hasher = Md5::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        let mut out = [0u8; 16];
        out.copy_from_slice(&hasher.finalize());
        Ok(ETag(out))
    }

    /// Get the raw bytes (the Content-MD5 value)
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex encoding
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, tolerating surrounding quotes
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.trim_matches('"'))?;
        if bytes.len() != 16 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&bytes);
        Ok(ETag(arr))
    }

    /// Whether an HTTP entity tag (quoted or bare, or `*`) names this ETag
    pub fn matches(&self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag == "*" {
            return true;
        }
        let tag = tag.strip_prefix("W/").unwrap_or(tag).trim_matches('"');
        tag.eq_ignore_ascii_case(&self.to_hex())
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ETag({})", self.to_hex())
    }
}

impl Default for ETag {
    fn default() -> Self {
        ETag::EMPTY
    }
}

impl AsRef<[u8]> for ETag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
