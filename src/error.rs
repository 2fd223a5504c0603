//! Error types for the node.

use thiserror::Error;

/// Errors produced by the consensus core and its HTTP/CLI adapters.
#[derive(Clone, Error, Debug)]
pub enum NodeError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("block rejected by chain rules")]
    StaleBlock,

    #[error("peer chain rejected: {0}")]
    ShorterOrInvalidChain(String),

    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid private key")]
    InvalidPrivateKey,

    #[error("transaction signing failed: {0}")]
    TransactionSignatureError(String),

    #[error("hex decoding failed: {0}")]
    HexDecodingError(String),

    #[error("address encoding failed: {0}")]
    AddressEncodingError(String),

    #[error("address decoding failed: {0}")]
    AddressDecodingError(String),

    #[error("json serialization failed: {0}")]
    SerializationError(String),

    #[error("lock poisoned: {0}")]
    PoisonedLockError(String),

    #[error("invalid mining difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("failed to bind node socket: {0}")]
    BindError(String),
}

pub type Result<T> = std::result::Result<T, NodeError>;
