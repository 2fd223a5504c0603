//! Transaction data model.
//!
//! Mirrors `original_source/internal/blockchain/transaction.go`: a transaction
//! is identified by sender, recipient and timestamp only — `value` and the
//! signature are excluded from identity (spec §3, §9 Open Question 4).

use serde::{Deserialize, Serialize};

use crate::crypto::{hash, keypair, signature};
use crate::error::{NodeError, Result};

/// The designated reward/node-origin sender address. Bypasses signature
/// verification in the mempool (spec §3, §4.2).
pub const NODE_ADDRESS: &str = "THE BLOCKCHAIN";

/// A value-transfer transaction. Immutable once constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub sender_blockchain_address: String,
    pub recipient_blockchain_address: String,
    pub value: f32,
    pub timestamp: i64,
}

/// Renders `value` the way Go's `encoding/json` renders a `float32`: the
/// shortest decimal text, with no trailing `.0` on whole numbers.
/// `serde_json` always appends a decimal point to a serialized float (to keep
/// it distinguishable from an integer when round-tripped through
/// `serde_json::Value`), so deriving `Serialize` on the canonical struct would
/// hash/sign a different preimage than the original Go node did for the same
/// field values — e.g. `200.0` instead of `200` (spec §8 S5).
fn format_value(value: f32) -> String {
    value.to_string()
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, value: f32, timestamp: i64) -> Self {
        Transaction {
            sender_blockchain_address: sender.into(),
            recipient_blockchain_address: recipient.into(),
            value,
            timestamp,
        }
    }

    /// The mining reward transaction appended to every mined block (spec §3).
    pub fn reward(miner_reward_sender: &str, recipient: &str, timestamp: i64) -> Self {
        Transaction::new(miner_reward_sender, recipient, 1.0, timestamp)
    }

    /// Identity: `hex(sender) + "_" + hex(recipient) + "_" + hex(timestamp)`.
    /// Independent of `value`; two transactions with the same identity
    /// collide in the mempool (spec §9 Open Question 4).
    pub fn identity(&self) -> String {
        format!(
            "{}_{}_{:x}",
            hash::to_hex(self.sender_blockchain_address.as_bytes()),
            hash::to_hex(self.recipient_blockchain_address.as_bytes()),
            self.timestamp,
        )
    }

    /// Canonical JSON text, fixed field order, used as the signature preimage
    /// and as the embedded form within a block's own hash. Built field-by-field
    /// rather than derived so `value`'s Go-compatible formatting (`format_value`)
    /// applies; sender/recipient go through `serde_json` purely for string
    /// escaping.
    pub fn canonical_fragment(&self) -> Result<String> {
        let sender = serde_json::to_string(&self.sender_blockchain_address)
            .map_err(|e| NodeError::SerializationError(e.to_string()))?;
        let recipient = serde_json::to_string(&self.recipient_blockchain_address)
            .map_err(|e| NodeError::SerializationError(e.to_string()))?;
        Ok(format!(
            r#"{{"sender_blockchain_address":{sender},"recipient_blockchain_address":{recipient},"value":{},"timestamp":{}}}"#,
            format_value(self.value),
            self.timestamp,
        ))
    }

    /// Canonical JSON bytes of [`Transaction::canonical_fragment`].
    pub fn canonical_json(&self) -> Result<Vec<u8>> {
        Ok(self.canonical_fragment()?.into_bytes())
    }

    pub fn is_node_origin(&self) -> bool {
        self.sender_blockchain_address.contains(NODE_ADDRESS)
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Transaction {}

/// Wire-only DTO accepted by `POST/PUT /transactions`. Never stored — the
/// mempool holds plain `Transaction`s once signature verification succeeds.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignedTransactionRequest {
    pub sender_blockchain_address: String,
    pub recipient_blockchain_address: String,
    pub value: f32,
    pub timestamp: i64,
    /// Hex of `X(32) || Y(32)`, 128 lowercase hex characters.
    pub sender_public_key: String,
    /// Hex of `r(32) || s(32)`, 128 lowercase hex characters.
    pub signature: String,
}

impl SignedTransactionRequest {
    pub fn transaction(&self) -> Transaction {
        Transaction::new(
            self.sender_blockchain_address.clone(),
            self.recipient_blockchain_address.clone(),
            self.value,
            self.timestamp,
        )
    }

    /// Verifies the request's signature over the canonical JSON of its
    /// transaction fields. Returns `false` on any malformed hex as well as
    /// on a genuine signature mismatch — the mempool doesn't distinguish
    /// the two (spec §4.2 step 4).
    pub fn verify(&self) -> bool {
        let Ok(public_key) = decode_hex(&self.sender_public_key) else {
            return false;
        };
        let Ok(sig) = decode_hex(&self.signature) else {
            return false;
        };
        let Ok(preimage) = self.transaction().canonical_json() else {
            return false;
        };
        signature::verify(&public_key, &sig, &preimage)
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    data_encoding::HEXLOWER
        .decode(s.as_bytes())
        .map_err(|e| NodeError::HexDecodingError(e.to_string()))
}

/// Signs a transaction with a private key, building a full
/// `SignedTransactionRequest` ready for `POST /transactions`.
pub fn sign_transaction(pkcs8: &[u8], transaction: &Transaction) -> Result<SignedTransactionRequest> {
    let public_key = keypair::public_key_from_pkcs8(pkcs8)?;
    let xy = keypair::public_key_xy(&public_key)?;
    let preimage = transaction.canonical_json()?;
    let sig = signature::sign(pkcs8, &preimage)?;

    Ok(SignedTransactionRequest {
        sender_blockchain_address: transaction.sender_blockchain_address.clone(),
        recipient_blockchain_address: transaction.recipient_blockchain_address.clone(),
        value: transaction.value,
        timestamp: transaction.timestamp,
        sender_public_key: hash::to_hex(&xy),
        signature: hash::to_hex(&sig),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keypair::new_key_pair;

    #[test]
    fn identity_excludes_value() {
        let a = Transaction::new("alice", "bob", 10.0, 1000);
        let b = Transaction::new("alice", "bob", 99.0, 1000);
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a, b);
    }

    #[test]
    fn identity_differs_on_timestamp() {
        let a = Transaction::new("alice", "bob", 10.0, 1000);
        let b = Transaction::new("alice", "bob", 10.0, 1001);
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let pkcs8 = new_key_pair().expect("keygen");
        let tx = Transaction::new("alice", "bob", 42.0, 1_654_369_662);
        let request = sign_transaction(&pkcs8, &tx).expect("sign");
        assert!(request.verify());
    }

    #[test]
    fn tampered_field_fails_verify() {
        let pkcs8 = new_key_pair().expect("keygen");
        let tx = Transaction::new("alice", "bob", 42.0, 1_654_369_662);
        let mut request = sign_transaction(&pkcs8, &tx).expect("sign");
        request.value = 43.0;
        assert!(!request.verify());
    }

    #[test]
    fn flipped_signature_char_fails_verify() {
        let pkcs8 = new_key_pair().expect("keygen");
        let tx = Transaction::new("alice", "bob", 42.0, 1_654_369_662);
        let mut request = sign_transaction(&pkcs8, &tx).expect("sign");
        let mut chars: Vec<char> = request.signature.chars().collect();
        let last = chars.len() - 1;
        chars[last] = if chars[last] == 'c' { 'd' } else { 'c' };
        request.signature = chars.into_iter().collect();
        assert!(!request.verify());
    }

    #[test]
    fn node_origin_sender_is_detected() {
        let tx = Transaction::reward(NODE_ADDRESS, "miner-address", 1000);
        assert!(tx.is_node_origin());
    }

    // S5 (spec §8): literal sender/recipient/value/timestamp/public-key/signature
    // vector from `original_source/internal/blockchain/transaction_pool_test.go`.
    // `value` is a whole number (200) signed by the original Go node, whose
    // `encoding/json` renders a whole-number float32 without a decimal point;
    // `canonical_fragment`'s `format_value` has to match that rendering or this
    // preimage — and the signature computed over it — would never verify.
    fn s5_request() -> SignedTransactionRequest {
        SignedTransactionRequest {
            sender_blockchain_address: "15TZoyyxFmeTXJGjYwX1X3ARtXX94BbFrk".to_string(),
            recipient_blockchain_address: "1CHD4Jjqsak4RV5JHAdYZ9CKY1dQe4tkXW".to_string(),
            value: 200.0,
            timestamp: 1_654_369_662,
            sender_public_key: "aed86cb86fe477183b5a9f452d2a7d26e81c9ce16b123c699cbc4cc61cb7111\
                df24ceebf3cb316b5740c19451ed390e9a9b1f5070cef639808af535570b01ce1"
                .to_string(),
            signature: "1dda674ee41218569a870993fe32fd3bf6a7bda3c657d4fae8fd0898adfdaf5\
                9eced8a5dd315f239c056197cf2b9a7a0bc4e941853be66e7e8a8427b14b9006b"
                .to_string(),
        }
    }

    #[test]
    fn canonical_fragment_formats_whole_number_value_without_decimal_point() {
        let tx = Transaction::new("a", "b", 200.0, 1_654_369_662);
        let fragment = tx.canonical_fragment().expect("fragment");
        assert!(fragment.contains(r#""value":200,"#), "got: {fragment}");
    }

    #[test]
    fn s5_literal_vector_verifies() {
        assert!(s5_request().verify());
    }

    #[test]
    fn s5_literal_vector_fails_with_flipped_final_signature_char() {
        let mut request = s5_request();
        let mut chars: Vec<char> = request.signature.chars().collect();
        let last = chars.len() - 1;
        chars[last] = 'c';
        request.signature = chars.into_iter().collect();
        assert!(!request.verify());
    }
}
