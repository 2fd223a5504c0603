//! The pending-transaction pool.
//!
//! Grounded on `original_source/internal/blockchain/transaction_pool.go`
//! (`AddAndVerifyTransaction`, `Copy`, `UpdateFromBlock`) and the teacher's
//! `core::memory_pool::MemoryPool` (`RwLock<HashMap<String, Transaction>>`,
//! lock-poisoning propagated as a typed error rather than panicking).

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::core::block::Block;
use crate::core::transaction::{SignedTransactionRequest, Transaction};
use crate::error::{NodeError, Result};

pub struct Mempool {
    transactions: RwLock<HashMap<String, Transaction>>,
    start_mining: UnboundedSender<()>,
}

impl Mempool {
    pub fn new(start_mining: UnboundedSender<()>) -> Self {
        Mempool {
            transactions: RwLock::new(HashMap::new()),
            start_mining,
        }
    }

    /// Validates and admits a transaction request (spec §4.2).
    ///
    /// `"THE BLOCKCHAIN"`-origin requests (the miner reward) skip signature
    /// verification and never fire the mining signal — they arrive already
    /// embedded in a mined block, not through this path in practice, but the
    /// bypass is kept for parity with the source's node-address exemption.
    pub fn admit(&self, request: &SignedTransactionRequest) -> Result<bool> {
        let transaction = request.transaction();

        if transaction.is_node_origin() {
            self.insert(transaction)?;
            return Ok(true);
        }

        if !request.verify() {
            return Ok(false);
        }

        let went_zero_to_one = self.insert(transaction)?;
        if went_zero_to_one {
            let sender = self.start_mining.clone();
            tokio::spawn(async move {
                if sender.send(()).is_err() {
                    warn!("mempool: start-mining signal dropped, no miner listening");
                }
            });
        }
        Ok(true)
    }

    /// Inserts `tx`, returning true iff the pool went from empty to non-empty.
    fn insert(&self, tx: Transaction) -> Result<bool> {
        let mut guard = self
            .transactions
            .write()
            .map_err(|e| NodeError::PoisonedLockError(e.to_string()))?;
        let was_empty = guard.is_empty();
        guard.insert(tx.identity(), tx);
        Ok(was_empty && !guard.is_empty())
    }

    /// Atomically returns every pending transaction and empties the pool.
    /// Used by the miner at the start of each mining attempt — draining
    /// happens unconditionally, before proof-of-work begins (spec §4.3,
    /// §9 Open Question 2).
    pub fn snapshot_and_clear(&self) -> Result<Vec<Transaction>> {
        let mut guard = self
            .transactions
            .write()
            .map_err(|e| NodeError::PoisonedLockError(e.to_string()))?;
        let drained: Vec<Transaction> = guard.values().cloned().collect();
        guard.clear();
        debug!(count = drained.len(), "mempool drained for mining attempt");
        Ok(drained)
    }

    /// Removes every transaction present in `block`, used after a foreign
    /// block is accepted onto the chain.
    pub fn remove_matching(&self, block: &Block) -> Result<()> {
        let mut guard = self
            .transactions
            .write()
            .map_err(|e| NodeError::PoisonedLockError(e.to_string()))?;
        for tx in &block.transactions {
            guard.remove(&tx.identity());
        }
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self
            .transactions
            .read()
            .map_err(|e| NodeError::PoisonedLockError(e.to_string()))?
            .len())
    }

    pub fn list(&self) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .read()
            .map_err(|e| NodeError::PoisonedLockError(e.to_string()))?
            .values()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::sign_transaction;
    use crate::crypto::keypair::new_key_pair;

    fn signed(pkcs8: &[u8], sender: &str, recipient: &str, value: f32, ts: i64) -> SignedTransactionRequest {
        sign_transaction(pkcs8, &Transaction::new(sender, recipient, value, ts)).expect("sign")
    }

    #[tokio::test]
    async fn admit_rejects_invalid_signature() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mempool = Mempool::new(tx);
        let pkcs8 = new_key_pair().expect("keygen");
        let mut request = signed(&pkcs8, "alice", "bob", 10.0, 1000);
        request.value = 20.0; // tamper after signing

        assert!(!mempool.admit(&request).unwrap());
        assert_eq!(mempool.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn admit_accepts_valid_signature_and_dedupes_identity() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mempool = Mempool::new(tx);
        let pkcs8 = new_key_pair().expect("keygen");
        let request = signed(&pkcs8, "alice", "bob", 10.0, 1000);

        assert!(mempool.admit(&request).unwrap());
        assert_eq!(mempool.len().unwrap(), 1);

        // same identity (sender, recipient, timestamp), different value —
        // overwrites rather than duplicating (spec §9 Open Question 4).
        let mut again = request.clone();
        again.value = 999.0;
        let resigned = signed(&pkcs8, "alice", "bob", 999.0, 1000);
        assert!(mempool.admit(&resigned).unwrap());
        let _ = again;
        assert_eq!(mempool.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn node_origin_bypasses_verification() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mempool = Mempool::new(tx);
        let reward = SignedTransactionRequest {
            sender_blockchain_address: crate::core::transaction::NODE_ADDRESS.to_string(),
            recipient_blockchain_address: "miner-address".to_string(),
            value: 1.0,
            timestamp: 1000,
            sender_public_key: String::new(),
            signature: String::new(),
        };
        assert!(mempool.admit(&reward).unwrap());
    }

    #[tokio::test]
    async fn snapshot_and_clear_drains_pool() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mempool = Mempool::new(tx);
        let pkcs8 = new_key_pair().expect("keygen");
        mempool.admit(&signed(&pkcs8, "alice", "bob", 1.0, 1)).unwrap();

        let drained = mempool.snapshot_and_clear().unwrap();
        assert_eq!(drained.len(), 1);
        assert_eq!(mempool.len().unwrap(), 0);
    }

    // S5 (spec §8): literal vector from
    // `original_source/internal/blockchain/transaction_pool_test.go`, routed
    // through `admit` itself rather than just `SignedTransactionRequest::verify`
    // (see `core::transaction` for the vector and the float-formatting note).
    #[tokio::test]
    async fn admit_accepts_the_literal_s5_vector() {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let mempool = Mempool::new(tx);
        let request = SignedTransactionRequest {
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
        };
        assert!(mempool.admit(&request).unwrap());
        assert_eq!(mempool.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn zero_to_one_transition_fires_signal_once() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mempool = Mempool::new(tx);
        let pkcs8 = new_key_pair().expect("keygen");

        mempool.admit(&signed(&pkcs8, "alice", "bob", 1.0, 1)).unwrap();
        mempool.admit(&signed(&pkcs8, "alice", "carol", 2.0, 2)).unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let mut signals = 0;
        while rx.try_recv().is_ok() {
            signals += 1;
        }
        assert_eq!(signals, 1);
    }
}
