//! Wires Chain, Mempool, Miner and Gateway together and owns their channels.
//!
//! Grounded on `original_source/internal/controller/controller.go` (`New`,
//! `start`, `updateBlockchainFromNetwork`, `CreateTransaction`,
//! `AddProposedBlockFromNetwork`, `newBlockMined`) and the teacher's
//! `node::context::NodeContext` central-wiring role. Restructured per spec §9
//! Design Notes point 1: the Go source gives the miner a back-pointer to the
//! controller so it can call `SignalCancelMining`/re-enter itself; here the
//! Coordinator holds a `MinerHandle` instead, and the miner never references
//! its owner.

use std::sync::Arc;

use reqwest::Method;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::core::block::Block;
use crate::core::chain::Chain;
use crate::core::mempool::Mempool;
use crate::core::transaction::SignedTransactionRequest;
use crate::error::Result;
use crate::node::gateway::Gateway;
use crate::node::miner::{Miner, MinerHandle};

/// Distinguishes a transaction submitted directly by a client from one
/// relayed by a peer — only the former gets re-broadcast (spec §4.5 event
/// handlers: POST = client origin, PUT = peer relay).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Origin {
    Local,
    Peer,
}

pub struct Coordinator<G: Gateway> {
    chain: Arc<Chain>,
    mempool: Arc<Mempool>,
    gateway: Arc<G>,
    miner_handle: MinerHandle,
}

impl<G: Gateway> Coordinator<G> {
    /// Boot sequence (spec §4.5): builds the core components, runs initial
    /// sync against whatever neighbors `gateway` already knows about, then
    /// spawns the miner and broadcast tasks. Returns the coordinator plus the
    /// background task handles so the caller can hold or abort them.
    pub async fn start(
        difficulty: usize,
        miner_reward_sender: String,
        node_address: String,
        gateway: Arc<G>,
    ) -> (Self, JoinHandle<()>, JoinHandle<()>) {
        let chain = Arc::new(Chain::new(difficulty));
        let (start_mining_tx, start_mining_rx) = mpsc::unbounded_channel();
        let (new_block_tx, new_block_rx) = mpsc::unbounded_channel();
        let mempool = Arc::new(Mempool::new(start_mining_tx));

        let (miner, miner_handle) = Miner::new(
            chain.clone(),
            mempool.clone(),
            miner_reward_sender,
            node_address,
        );

        let coordinator = Coordinator {
            chain: chain.clone(),
            mempool: mempool.clone(),
            gateway: gateway.clone(),
            miner_handle,
        };

        coordinator.initial_sync().await;

        let miner_task = tokio::spawn(miner.run(start_mining_rx, new_block_tx));
        let broadcast_task = tokio::spawn(Self::run_broadcast(gateway, new_block_rx));

        (coordinator, miner_task, broadcast_task)
    }

    /// Calls `fetch_chains`, and among the results that are both strictly
    /// longer than the current chain and pass `is_valid_chain`, adopts the
    /// longest, breaking ties by first-arrived (spec §4.5 step 3,
    /// `original_source/internal/controller/controller.go::updateBlockchainFromNetwork`).
    async fn initial_sync(&self) {
        let current_len = self.chain.len().unwrap_or(1);
        let mut best: Option<Vec<Block>> = None;

        for candidate in self.gateway.fetch_chains().await {
            let is_longer = candidate.len() > best.as_ref().map(Vec::len).unwrap_or(current_len);
            if !is_longer {
                continue;
            }
            if self.chain.is_valid_chain(&candidate).unwrap_or(false) {
                best = Some(candidate);
            }
        }

        if let Some(chain) = best {
            info!(len = chain.len(), "coordinator: adopting longer peer chain");
            let tail = chain.last().cloned();
            if self.chain.replace_chain(chain).is_ok() {
                if let Some(tail) = tail {
                    let _ = self.mempool.remove_matching(&tail);
                }
            }
        }
    }

    async fn run_broadcast(gateway: Arc<G>, mut new_block_mined: mpsc::UnboundedReceiver<Block>) {
        while let Some(block) = new_block_mined.recv().await {
            let payload = match serde_json::to_value(&block) {
                Ok(payload) => payload,
                Err(_) => continue,
            };
            gateway.notify("add_block", Method::POST, payload).await;
        }
    }

    /// Admits a transaction, broadcasting it to peers only if it originated
    /// locally (spec §4.5 event handlers).
    pub async fn submit_transaction(&self, request: SignedTransactionRequest, origin: Origin) -> Result<bool> {
        let admitted = self.mempool.admit(&request)?;
        if admitted && origin == Origin::Local {
            if let Ok(payload) = serde_json::to_value(&request) {
                self.gateway.notify("transactions", Method::PUT, payload).await;
            }
        }
        Ok(admitted)
    }

    /// Accepts a block proposed by a peer, draining the mempool of anything
    /// it contains and cancelling the current mining attempt on success
    /// (spec §4.5 event handlers).
    pub fn accept_foreign_block(&self, block: Block) -> Result<bool> {
        let accepted = self.chain.accept_foreign_block(block.clone())?;
        if accepted {
            self.mempool.remove_matching(&block)?;
            self.miner_handle.cancel();
        }
        Ok(accepted)
    }

    pub fn get_chain(&self) -> Result<Vec<Block>> {
        self.chain.snapshot()
    }

    pub fn list_transactions(&self) -> Result<Vec<crate::core::Transaction>> {
        self.mempool.list()
    }

    pub fn get_balance(&self, address: &str) -> Result<f32> {
        self.chain.total_amount(address)
    }

    pub fn neighbor_count(&self) -> usize {
        self.gateway.neighbor_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{sign_transaction, Transaction};
    use crate::crypto::keypair::new_key_pair;
    use std::future::Future;

    struct NoopGateway;

    impl Gateway for NoopGateway {
        fn notify(&self, _endpoint: &str, _method: Method, _payload: serde_json::Value) -> impl Future<Output = ()> + Send {
            async {}
        }

        fn fetch_chains(&self) -> impl Future<Output = Vec<Vec<Block>>> + Send {
            async { Vec::new() }
        }

        fn neighbor_count(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn boots_with_only_genesis_when_no_peers() {
        let gateway = Arc::new(NoopGateway);
        let (coordinator, miner_task, broadcast_task) =
            Coordinator::start(1, "THE BLOCKCHAIN".into(), "miner-addr".into(), gateway).await;

        assert_eq!(coordinator.get_chain().unwrap().len(), 1);
        assert_eq!(coordinator.neighbor_count(), 0);

        miner_task.abort();
        broadcast_task.abort();
    }

    #[tokio::test]
    async fn submit_transaction_admits_and_balance_reflects_chain() {
        let gateway = Arc::new(NoopGateway);
        let (coordinator, miner_task, broadcast_task) =
            Coordinator::start(1, "THE BLOCKCHAIN".into(), "miner-addr".into(), gateway).await;

        let pkcs8 = new_key_pair().expect("keygen");
        let request = sign_transaction(&pkcs8, &Transaction::new("alice", "bob", 5.0, 1)).expect("sign");
        let admitted = coordinator.submit_transaction(request, Origin::Local).await.unwrap();
        assert!(admitted);

        assert_eq!(coordinator.get_balance("alice").unwrap(), 0.0);

        miner_task.abort();
        broadcast_task.abort();
    }
}
