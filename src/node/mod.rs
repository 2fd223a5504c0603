// Declares the node-level components wired around the consensus core:
// the miner, the peer gateway, and the coordinator that owns their lifecycle.
pub mod coordinator;
pub mod gateway;
pub mod miner;

pub use coordinator::Coordinator;
pub use gateway::{Gateway, HttpGateway};
pub use miner::{CancelToken, Miner, MinerHandle};
