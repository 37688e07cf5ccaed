//! BLAKE3 content hashing.
//!
//! The digest of an item's serialized plaintext is its lookup identity.

use std::fmt;

const CONTENT_DOMAIN: &[u8] = b"sdc-content-v1\x00";

/// 32-byte content digest. Displayed as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}…)", hex::encode(&self.0[..8]))
    }
}

/// Digest of already-serialized plaintext.
pub fn content_hash(serialized: &[u8]) -> ContentHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(CONTENT_DOMAIN);
    hasher.update(serialized);
    ContentHash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_input_equal_hash() {
        assert_eq!(content_hash(b"\"X\""), content_hash(b"\"X\""));
        assert_ne!(content_hash(b"\"X\""), content_hash(b"\"Y\""));
    }

    #[test]
    fn domain_separated_from_plain_blake3() {
        let plain: [u8; 32] = blake3::hash(b"abc").into();
        assert_ne!(content_hash(b"abc").as_bytes(), &plain);
    }

    #[test]
    fn hex_display() {
        let hash = content_hash(b"abc");
        assert_eq!(hash.to_string().len(), 64);
        assert_eq!(hash.to_string(), hash.to_hex());
    }
}
