//! SHA-256 hashing helpers.

use sha2::{Digest, Sha256};

/// SHA-256 digest of arbitrary bytes.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 applied twice, used for the address checksum.
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Lowercase hex rendering of a hash, used for JSON fields and the PoW predicate.
pub fn to_hex(bytes: &[u8]) -> String {
    data_encoding::HEXLOWER.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_is_deterministic_and_32_bytes() {
        let a = sha256(b"hello");
        let b = sha256(b"hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_ne!(a, sha256(b"hellp"));
    }

    #[test]
    fn double_sha256_is_sha256_of_sha256() {
        let once = sha256(b"hello");
        let twice = sha256(&once);
        assert_eq!(double_sha256(b"hello"), twice);
    }

    #[test]
    fn to_hex_is_lowercase() {
        let digest = sha256(b"x");
        let hex = to_hex(&digest);
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
