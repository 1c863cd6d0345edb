use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// SHA-1 fingerprint of a file's content.
///
/// A `ContentSha` is computed over the UTF-8 encoding of a file's text and
/// rendered as 40 lowercase hex characters. It is used strictly as an
/// equality fingerprint for change detection: identical content always
/// produces the same sha, and nothing relies on collision resistance beyond
/// "different bytes almost always differ".
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentSha([u8; 20]);

impl ContentSha {
    /// Fingerprint the UTF-8 encoding of `content`.
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(content.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create a `ContentSha` from a pre-computed digest.
    pub fn from_digest(digest: [u8; 20]) -> Self {
        Self(digest)
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Hex-encoded string representation (40 lowercase characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 20 {
            return Err(TypeError::InvalidLength {
                expected: 20,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentSha({})", self.short_hex())
    }
}

impl fmt::Display for ContentSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 20]> for ContentSha {
    fn from(digest: [u8; 20]) -> Self {
        Self(digest)
    }
}

// Serialized as the hex string so the index file stays a readable JSON
// document (shas are compared and eyeballed as hex everywhere else too).
impl Serialize for ContentSha {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentSha {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = ContentSha;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a 40-character hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ContentSha, E> {
                ContentSha::from_hex(v).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_is_deterministic() {
        let a = ContentSha::of("hello world");
        let b = ContentSha::of("hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_content_produces_different_shas() {
        assert_ne!(ContentSha::of("hello"), ContentSha::of("world"));
    }

    #[test]
    fn known_vector() {
        // sha1("hello world")
        assert_eq!(
            ContentSha::of("hello world").to_hex(),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
    }

    #[test]
    fn hex_is_lowercase_and_40_chars() {
        let hex = ContentSha::of("abc").to_hex();
        assert_eq!(hex.len(), 40);
        assert_eq!(hex, hex.to_lowercase());
    }

    #[test]
    fn hex_roundtrip() {
        let sha = ContentSha::of("roundtrip");
        assert_eq!(ContentSha::from_hex(&sha.to_hex()).unwrap(), sha);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(matches!(
            ContentSha::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
        assert!(matches!(
            ContentSha::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 20,
                actual: 2
            })
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let sha = ContentSha::of("display");
        assert_eq!(format!("{sha}"), sha.to_hex());
    }

    #[test]
    fn serde_roundtrip_as_hex_string() {
        let sha = ContentSha::of("serde");
        let json = serde_json::to_string(&sha).unwrap();
        assert_eq!(json, format!("\"{}\"", sha.to_hex()));
        let parsed: ContentSha = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, sha);
    }

    #[test]
    fn empty_string_has_a_sha() {
        assert_eq!(
            ContentSha::of("").to_hex(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }
}
