//! ECDSA P-256 key pair generation.
//!
//! Keys are generated and stored in PKCS#8 form, matching `ring`'s own
//! `EcdsaKeyPair::from_pkcs8` constructor used throughout `signature.rs`.

use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair};

use crate::error::{NodeError, Result};

/// Generates a fresh P-256 key pair, returned as PKCS#8 document bytes.
pub fn new_key_pair() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|_| NodeError::InvalidPrivateKey)?;
    Ok(pkcs8.as_ref().to_vec())
}

/// Derives the raw, uncompressed public key (`0x04 || X(32) || Y(32)`, 65 bytes)
/// from a PKCS#8-encoded private key.
pub fn public_key_from_pkcs8(pkcs8: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|_| NodeError::InvalidPrivateKey)?;
    Ok(key_pair.public_key().as_ref().to_vec())
}

/// Strips the leading `0x04` uncompressed-point tag, leaving `X(32) || Y(32)`
/// — the layout spec §6 calls for in wire/address derivation.
pub fn public_key_xy(uncompressed: &[u8]) -> Result<[u8; 64]> {
    if uncompressed.len() != 65 || uncompressed[0] != 0x04 {
        return Err(NodeError::InvalidPublicKey);
    }
    let mut xy = [0u8; 64];
    xy.copy_from_slice(&uncompressed[1..]);
    Ok(xy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_has_65_byte_uncompressed_public_key() {
        let pkcs8 = new_key_pair().expect("keygen");
        let public = public_key_from_pkcs8(&pkcs8).expect("public key");
        assert_eq!(public.len(), 65);
        assert_eq!(public[0], 0x04);
    }

    #[test]
    fn public_key_xy_extracts_64_bytes() {
        let pkcs8 = new_key_pair().expect("keygen");
        let public = public_key_from_pkcs8(&pkcs8).expect("public key");
        let xy = public_key_xy(&public).expect("xy");
        assert_eq!(xy.len(), 64);
    }

    #[test]
    fn two_generated_keys_differ() {
        let a = new_key_pair().expect("keygen a");
        let b = new_key_pair().expect("keygen b");
        assert_ne!(a, b);
    }
}
