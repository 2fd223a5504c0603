// Declares the consensus-core modules.
pub mod block;
pub mod chain;
pub mod mempool;
pub mod proof_of_work;
pub mod transaction;

pub use block::Block;
pub use chain::Chain;
pub use mempool::Mempool;
pub use transaction::{SignedTransactionRequest, Transaction};
