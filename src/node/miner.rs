//! The mining task.
//!
//! Grounded on `original_source/internal/blockchain/miner.go` (`mineBlock`,
//! `proofOfWork`'s nonce-starts-at-(-1), poll-`ctx.Done()`-per-iteration
//! shape, and the drain-before-PoW sequencing), re-architected per spec §9
//! Design Notes point 2: the source re-enters `SignalStartMining` from a
//! `defer` at the end of every `mineBlock`, growing the call stack forever.
//! Here the wait/attempt cycle is a single top-level `loop`, never recursive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::core::block::Block;
use crate::core::chain::Chain;
use crate::core::mempool::Mempool;
use crate::core::proof_of_work::valid_proof;
use crate::core::transaction::Transaction;
use crate::error::Result;

/// Cooperative cancellation token for one mining attempt. Checked once per
/// nonce iteration; takes effect within one iteration (spec §5).
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Handle the Coordinator holds to preempt the miner's current attempt
/// without owning the miner task itself (spec §9 Design Notes point 1 — no
/// back-pointer from the miner to its owner).
#[derive(Clone, Default)]
pub struct MinerHandle {
    current: Arc<std::sync::Mutex<CancelToken>>,
}

impl MinerHandle {
    pub fn cancel(&self) {
        if let Ok(guard) = self.current.lock() {
            guard.cancel();
        }
    }

    fn publish(&self, token: CancelToken) {
        if let Ok(mut guard) = self.current.lock() {
            *guard = token;
        }
    }
}

pub struct Miner {
    chain: Arc<Chain>,
    mempool: Arc<Mempool>,
    miner_reward_sender: String,
    node_address: String,
    handle: MinerHandle,
}

impl Miner {
    pub fn new(
        chain: Arc<Chain>,
        mempool: Arc<Mempool>,
        miner_reward_sender: String,
        node_address: String,
    ) -> (Self, MinerHandle) {
        let handle = MinerHandle::default();
        (
            Miner {
                chain,
                mempool,
                miner_reward_sender,
                node_address,
                handle: handle.clone(),
            },
            handle,
        )
    }

    /// Top-level state machine: Idle until a start-mining signal arrives and
    /// the mempool is non-empty, then Mining until the attempt terminates
    /// (success, cancellation, or an append race), then back to Idle.
    pub async fn run(
        self,
        mut start_mining: UnboundedReceiver<()>,
        new_block_mined: UnboundedSender<Block>,
    ) {
        info!("miner: waiting for start-mining signal");
        while start_mining.recv().await.is_some() {
            let pending = self.mempool.len().unwrap_or(0);
            if pending == 0 {
                continue;
            }
            if let Some(block) = self.attempt_mine() {
                if new_block_mined.send(block).is_err() {
                    debug!("miner: new-block-mined channel closed, stopping");
                    return;
                }
            }
        }
    }

    /// A single mining attempt (spec §4.3).
    fn attempt_mine(&self) -> Option<Block> {
        let token = CancelToken::default();
        self.handle.publish(token.clone());

        // Draining happens before PoW starts: a cancelled attempt loses
        // these transactions (spec §9 Open Question 2 — preserved, not
        // mitigated).
        let mut txs = match self.mempool.snapshot_and_clear() {
            Ok(txs) => txs,
            Err(_) => return None,
        };

        let tail = self.chain.last_block().ok()?;
        let reward_timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();
        txs.push(Transaction::reward(&self.miner_reward_sender, &self.node_address, reward_timestamp));

        let prev_hash = tail.hash().ok()?;
        let number = tail.number + 1;
        let difficulty = self.chain.difficulty();

        let nonce = self.search_nonce(number, prev_hash, &txs, difficulty, &token)?;

        let block = Block::new(number, nonce, prev_hash, txs);
        match self.chain.append(block.clone()) {
            Ok(true) => Some(block),
            _ => None,
        }
    }

    /// Nonce search: increment from 0, polling cancellation once per
    /// iteration (spec §4.3 step 5).
    fn search_nonce(
        &self,
        number: i64,
        prev_hash: [u8; 32],
        txs: &[Transaction],
        difficulty: usize,
        token: &CancelToken,
    ) -> Option<i64> {
        let mut nonce: i64 = -1;
        loop {
            if token.is_cancelled() {
                debug!("miner: attempt cancelled at nonce {}", nonce);
                return None;
            }
            nonce += 1;
            if valid_proof(number, nonce, prev_hash, txs, difficulty) {
                return Some(nonce);
            }
        }
    }
}
