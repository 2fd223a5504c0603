//! Proof-of-work predicate.
//!
//! Grounded on `original_source/internal/blockchain/blockchain.go::validProof`:
//! the candidate block used for the PoW check is built with `timestamp` left
//! at its zero value, never the real construction-time timestamp the mined
//! block itself hashes with. This asymmetry is preserved verbatim — see
//! DESIGN.md, Open Question 1. Do not "fix" it.

use crate::core::block::Block;
use crate::core::transaction::Transaction;
use crate::crypto::hash;

/// Returns true iff the lowercase-hex rendering of the candidate's hash
/// begins with `difficulty` leading `'0'` characters.
///
/// The candidate is `(number, nonce, prev_hash, transactions)` hashed with
/// `timestamp = 0` — not the real block's timestamp.
pub fn valid_proof(
    number: i64,
    nonce: i64,
    previous_hash: [u8; 32],
    transactions: &[Transaction],
    difficulty: usize,
) -> bool {
    let candidate = Block {
        number,
        nonce,
        previous_hash,
        transactions: transactions.to_vec(),
        timestamp: 0,
    };
    let Ok(digest) = candidate.hash() else {
        return false;
    };
    let hex = hash::to_hex(&digest);
    hex.len() >= difficulty && hex.as_bytes()[..difficulty].iter().all(|&b| b == b'0')
}
