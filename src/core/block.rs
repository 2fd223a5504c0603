//! Block data model.
//!
//! Hash = SHA-256 of the canonical JSON serialization, field order fixed as
//! `number, nonce, previous_hash (lowercase hex), timestamp, transactions`
//! (spec §3, grounded on `original_source/internal/blockchain/block.go::MarshalJSON`).

use serde::{Deserialize, Serialize};

use crate::core::transaction::Transaction;
use crate::crypto::hash;
use crate::error::{NodeError, Result};

/// The previous-hash of the genesis block: SHA-256 of an all-zero, empty block.
pub fn genesis_previous_hash() -> [u8; 32] {
    [0u8; 32]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub number: i64,
    pub nonce: i64,
    #[serde(with = "hex_array")]
    pub previous_hash: [u8; 32],
    pub transactions: Vec<Transaction>,
    pub timestamp: i64,
}

impl Block {
    /// Constructs a block with `timestamp` set to the current wall-clock time
    /// in nanoseconds — the real, hashed timestamp (contrast with
    /// `core::proof_of_work::valid_proof`'s timestamp-zeroed candidate).
    pub fn new(number: i64, nonce: i64, previous_hash: [u8; 32], transactions: Vec<Transaction>) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or_default();
        Block {
            number,
            nonce,
            previous_hash,
            transactions,
            timestamp,
        }
    }

    /// Constructs the deterministic genesis block: number=1, nonce=0,
    /// previous_hash = hash of an empty block, no transactions (spec §3).
    pub fn genesis() -> Self {
        Block::new(1, 0, genesis_previous_hash(), Vec::new())
    }

    /// Canonical JSON text, fixed field order
    /// (`number, nonce, previous_hash, timestamp, transactions`), the exact
    /// bytes that get hashed. Transactions are embedded via
    /// [`Transaction::canonical_fragment`] rather than their derived
    /// `Serialize` impl, so a block's hash uses the same Go-compatible
    /// `value` formatting as the signature preimage (spec §8 S5) — otherwise
    /// the same transaction would hash differently depending on whether it
    /// was reached standalone or embedded in a block.
    pub fn canonical_json(&self) -> Result<Vec<u8>> {
        let mut fragments = Vec::with_capacity(self.transactions.len());
        for tx in &self.transactions {
            fragments.push(tx.canonical_fragment()?);
        }
        let json = format!(
            r#"{{"number":{},"nonce":{},"previous_hash":"{}","timestamp":{},"transactions":[{}]}}"#,
            self.number,
            self.nonce,
            hash::to_hex(&self.previous_hash),
            self.timestamp,
            fragments.join(","),
        );
        Ok(json.into_bytes())
    }

    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(hash::sha256(&self.canonical_json()?))
    }
}

mod hex_array {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::crypto::hash::to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = data_encoding::HEXLOWER
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)?;
        if bytes.len() != 32 {
            return Err(serde::de::Error::custom("previous_hash must be 32 bytes"));
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(out)
    }
}
