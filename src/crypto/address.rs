//! Blockchain address derivation.
//!
//! `ECDSA P-256 public key -> SHA-256(X||Y) -> RIPEMD-160 -> prepend version
//! byte -> double-SHA-256 checksum -> Base58Check` (spec §6).

use ripemd::{Digest, Ripemd160};

use crate::crypto::hash::double_sha256;
use crate::error::{NodeError, Result};

const VERSION: u8 = 0x00;
const CHECKSUM_LEN: usize = 4;

/// Base58-encodes arbitrary bytes.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes a Base58 string back to bytes.
pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| NodeError::AddressDecodingError(e.to_string()))
}

/// RIPEMD-160 of the SHA-256 of the public key's `X || Y` bytes.
fn hash_public_key(public_key_xy: &[u8]) -> [u8; 20] {
    let sha = crate::crypto::hash::sha256(public_key_xy);
    let mut hasher = Ripemd160::new();
    hasher.update(sha);
    hasher.finalize().into()
}

/// Derives a Base58Check blockchain address from an uncompressed-point `X || Y`
/// public key (64 bytes, no `0x04` tag).
pub fn address_from_public_key(public_key_xy: &[u8]) -> String {
    let ripemd = hash_public_key(public_key_xy);

    let mut versioned = Vec::with_capacity(1 + ripemd.len());
    versioned.push(VERSION);
    versioned.extend_from_slice(&ripemd);

    let checksum = double_sha256(&versioned);

    let mut payload = versioned;
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    base58_encode(&payload)
}

/// Validates that a Base58Check address has the expected payload length and a
/// checksum that matches its version+hash bytes.
pub fn validate_address(address: &str) -> bool {
    let Ok(payload) = base58_decode(address) else {
        return false;
    };
    if payload.len() != 1 + 20 + CHECKSUM_LEN {
        return false;
    }
    let (versioned, checksum) = payload.split_at(payload.len() - CHECKSUM_LEN);
    let expected = double_sha256(versioned);
    checksum == &expected[..CHECKSUM_LEN]
}
