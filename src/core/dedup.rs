//! Dedup keys: the URL-safe, unpadded base64 form of a file's SHA-1 digest.
//!
//! The backend indexes uploaded content by this key, so computing it locally
//! lets the pipeline ask whether a file is already present before sending it.

use std::fs::File;
use std::path::Path;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::{Digest as _, Sha1};
use super::errors::{GpError, Result};

pub const DIGEST_LEN: usize = 20;

/// Raw SHA-1 digest
pub type Digest = [u8; DIGEST_LEN];

/// Content key the backend uses to spot duplicates
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    /// Key for an already computed SHA-1 digest
    pub fn from_digest(digest: &Digest) -> Self {
        Self(encode(digest))
    }

    /// Parse a key received from elsewhere, rejecting anything that does not
    /// decode to exactly one digest.
    pub fn parse(key: &str) -> Result<Self> {
        decode_digest(key)?;
        Ok(Self(key.to_string()))
    }

    /// The encoded key text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode back to the raw digest
    pub fn to_digest(&self) -> Result<Digest> {
        decode_digest(&self.0)
    }
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_url_safe(standard: &str) -> String {
    standard
        .replace('+', "-")
        .replace('/', "_")
        .trim_end_matches('=')
        .to_string()
}

fn from_url_safe(url_safe: &str) -> String {
    let mut standard = url_safe.replace('-', "+").replace('_', "/");
    let rem = standard.len() % 4;
    if rem > 0 {
        standard.push_str(&"=".repeat(4 - rem));
    }
    standard
}

/// Standard base64 with `+`/`/` swapped for `-`/`_` and padding dropped
pub fn encode(bytes: &[u8]) -> String {
    to_url_safe(&STANDARD.encode(bytes))
}

/// Inverse of [`encode`]; fails with `MalformedKey` on invalid input
pub fn decode(key: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(from_url_safe(key))
        .map_err(|err| GpError::malformed_key(key, err))
}

/// Like [`decode`], but the result must be exactly one digest long
pub fn decode_digest(key: &str) -> Result<Digest> {
    let bytes = decode(key)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        GpError::malformed_key(key, format!("expected {DIGEST_LEN} bytes, got {len}"))
    })
}

/// Hash a file's content. Blocking; call from `spawn_blocking` inside the runtime.
pub fn sha1_file(path: &Path) -> Result<Digest> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample(len: usize) -> Vec<u8> {
        // 0xfb/0xff bytes push '+' and '/' into the standard alphabet output
        (0..len).map(|i| [0xfb, 0xff, 0xbf, i as u8][i % 4]).collect()
    }

    #[test]
    fn test_round_trip_without_padding() {
        let bytes = sample(18);
        let key = encode(&bytes);
        assert_eq!(key.len() % 4, 0);
        assert_eq!(decode(&key).unwrap(), bytes);
    }

    #[test]
    fn test_round_trip_two_padding_chars() {
        let bytes = sample(19);
        let key = encode(&bytes);
        assert_eq!(key.len() % 4, 2);
        assert_eq!(decode(&key).unwrap(), bytes);
    }

    #[test]
    fn test_round_trip_one_padding_char() {
        let bytes = sample(20);
        let key = encode(&bytes);
        assert_eq!(key.len(), 27);
        assert_eq!(key.len() % 4, 3);
        assert_eq!(decode(&key).unwrap(), bytes);
    }

    #[test]
    fn test_three_padding_chars_is_malformed() {
        let err = decode("abcde").unwrap_err();
        assert!(matches!(err, GpError::MalformedKey { .. }));
    }

    #[test]
    fn test_key_is_url_safe() {
        let key = encode(&sample(20));
        assert!(!key.contains('+'));
        assert!(!key.contains('/'));
        assert!(!key.contains('='));
        assert!(key.contains('-') || key.contains('_'));
    }

    #[test]
    fn test_invalid_characters_are_malformed() {
        assert!(matches!(decode("ab!d"), Err(GpError::MalformedKey { .. })));
    }

    #[test]
    fn test_decode_digest_checks_length() {
        let short = encode(&sample(19));
        assert!(matches!(decode_digest(&short), Err(GpError::MalformedKey { .. })));

        let digest: Digest = sample(20).try_into().unwrap();
        let key = DedupKey::from_digest(&digest);
        assert_eq!(key.to_digest().unwrap(), digest);
        assert_eq!(DedupKey::parse(key.as_str()).unwrap(), key);
    }

    #[test]
    fn test_sha1_file_known_vector() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();

        let digest = sha1_file(file.path()).unwrap();
        // SHA-1("abc") = a9993e364706816aba3e25717850c26c9cd0d89d
        assert_eq!(encode(&digest), "qZk-NkcGgWq6PiVxeFDCbJzQ2J0");
    }
}
