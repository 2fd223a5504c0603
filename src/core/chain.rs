//! The replicated append-only chain.
//!
//! Grounded on `original_source/internal/blockchain/blockchain.go` (`addBlock`,
//! `replaceLastBlock`, `validProof`, `AddProposedBlockFromNetwork`,
//! `IsValidChain`, `CalculateTotalAmount`), restructured around a short-held
//! `std::sync::Mutex` guarded the way the teacher's `core::memory_pool::
//! MemoryPool` propagates lock-poisoning as a typed error instead of panicking.

use std::sync::{Mutex, MutexGuard};

use crate::core::block::Block;
use crate::core::proof_of_work::valid_proof;
use crate::error::{NodeError, Result};

pub struct Chain {
    blocks: Mutex<Vec<Block>>,
    difficulty: usize,
}

impl Chain {
    /// Builds a fresh chain containing only the genesis block.
    pub fn new(difficulty: usize) -> Self {
        Chain {
            blocks: Mutex::new(vec![Block::genesis()]),
            difficulty,
        }
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Block>>> {
        self.blocks
            .lock()
            .map_err(|e| NodeError::PoisonedLockError(e.to_string()))
    }

    /// A clone of the current tail. Blocks are immutable so this is cheap
    /// relative to holding the lock across a hash computation.
    pub fn last_block(&self) -> Result<Block> {
        let guard = self.lock()?;
        Ok(guard.last().cloned().expect("chain always has a genesis block"))
    }

    /// Snapshot of the whole chain, used for serving `/` and for
    /// `is_valid_chain` comparisons against peer chains.
    pub fn snapshot(&self) -> Result<Vec<Block>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Accepts `block` iff its `previous_hash` matches the current tail's
    /// hash. Returns whether it was appended.
    pub fn append(&self, block: Block) -> Result<bool> {
        let last_hash = self.last_block()?.hash()?;
        if block.previous_hash != last_hash {
            return Ok(false);
        }
        self.lock()?.push(block);
        Ok(true)
    }

    /// Overwrites the current tail — used only by the fork-at-the-tip rule.
    fn replace_tail(&self, block: Block) -> Result<()> {
        let mut guard = self.lock()?;
        let last = guard.len() - 1;
        guard[last] = block;
        Ok(())
    }

    /// Atomically swaps the whole chain — used only during initial sync when a
    /// longer, valid peer chain is adopted (spec §4.5 step 3).
    pub fn replace_chain(&self, blocks: Vec<Block>) -> Result<()> {
        *self.lock()? = blocks;
        Ok(())
    }

    /// Validates a whole chain: hash-linkage plus the PoW predicate on every
    /// non-genesis block.
    pub fn is_valid_chain(&self, chain: &[Block]) -> Result<bool> {
        let mut previous = match chain.first() {
            Some(block) => block,
            None => return Ok(false),
        };
        for block in &chain[1..] {
            if block.previous_hash != previous.hash()? {
                return Ok(false);
            }
            if !valid_proof(
                block.number,
                block.nonce,
                block.previous_hash,
                &block.transactions,
                self.difficulty,
            ) {
                return Ok(false);
            }
            previous = block;
        }
        Ok(true)
    }

    /// The fork-at-the-tip rule (spec §4.1).
    pub fn accept_foreign_block(&self, block: Block) -> Result<bool> {
        let tail = self.last_block()?;

        if block.number == tail.number + 1 {
            let tail_hash = tail.hash()?;
            if valid_proof(block.number, block.nonce, tail_hash, &block.transactions, self.difficulty) {
                self.lock()?.push(block);
                return Ok(true);
            }
            return Ok(false);
        }

        if block.number == tail.number && block.timestamp < tail.timestamp {
            if valid_proof(
                block.number,
                block.nonce,
                tail.previous_hash,
                &block.transactions,
                self.difficulty,
            ) {
                self.replace_tail(block)?;
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Folds over every transaction in every block: `+value` where `addr` is
    /// recipient, `-value` where `addr` is sender. Unchecked `f32` summation,
    /// no overflow/precision guards (spec §9 Open Question 5).
    pub fn total_amount(&self, address: &str) -> Result<f32> {
        let snapshot = self.snapshot()?;
        let mut total = 0.0f32;
        for block in &snapshot {
            for tx in &block.transactions {
                if tx.recipient_blockchain_address == address {
                    total += tx.value;
                }
                if tx.sender_blockchain_address == address {
                    total -= tx.value;
                }
            }
        }
        Ok(total)
    }
}
