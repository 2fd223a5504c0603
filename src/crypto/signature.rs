//! ECDSA P-256 signing and verification in the fixed (non-DER) `r || s` format
//! spec §6 requires for the wire signature field.

use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_FIXED, ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair};

use crate::error::{NodeError, Result};

/// Signs `message` with the PKCS#8-encoded private key, returning the raw
/// `r(32) || s(32)` signature (not ASN.1 DER).
pub fn sign(pkcs8: &[u8], message: &[u8]) -> Result<[u8; 64]> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| NodeError::TransactionSignatureError(e.to_string()))?;
    let signature = key_pair
        .sign(&rng, message)
        .map_err(|e| NodeError::TransactionSignatureError(e.to_string()))?;
    let bytes = signature.as_ref();
    if bytes.len() != 64 {
        return Err(NodeError::TransactionSignatureError(
            "unexpected signature length".into(),
        ));
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(bytes);
    Ok(out)
}

/// Verifies a raw `r || s` signature against `X || Y` public key bytes (64
/// bytes each, no `0x04` point tag — that tag is re-added here before
/// handing the key to `ring`).
pub fn verify(public_key_xy: &[u8], signature: &[u8], message: &[u8]) -> bool {
    if public_key_xy.len() != 64 || signature.len() != 64 {
        return false;
    }
    let mut sec1 = Vec::with_capacity(65);
    sec1.push(0x04);
    sec1.extend_from_slice(public_key_xy);
    let public_key = ring::signature::UnparsedPublicKey::new(&ECDSA_P256_SHA256_FIXED, sec1);
    public_key.verify(message, signature).is_ok()
}
