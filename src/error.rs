//! Crate-wide error types.
//!
//! `TxError` and `BlockError` are closed, matchable failure taxonomies for
//! the ledger and block-acceptance paths respectively (§4.4/§4.5/§7);
//! `BlockchainError` is the umbrella type everything else converts into.

use thiserror::Error;

/// The seven reason codes §4.4/§7 name for transaction application failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("bad signature")]
    BadSignature,
    #[error("bad address")]
    BadAddress,
    #[error("bad nonce")]
    BadNonce,
    #[error("amount<=0")]
    NonPositiveAmount,
    #[error("insufficient")]
    Insufficient,
    #[error("not owner")]
    NotOwner,
    #[error("unknown tx type")]
    UnknownTxType,
}

/// Block-acceptance failures: linkage, proof-of-work, or a transaction
/// failing with the `TxError` it carries.
#[derive(Debug, Clone, Error)]
pub enum BlockError {
    #[error("block height {got} does not extend tip height {expected}")]
    HeightGap { expected: u64, got: u64 },
    #[error("block prev_hash does not match tip hash")]
    BadLinkage,
    #[error("block hash does not meet required difficulty")]
    InsufficientWork,
    #[error("transaction invalid: {0}")]
    InvalidTx(#[from] TxError),
    #[error("reward {reward} exceeds unclaimed pool {pool}")]
    RewardExceedsPool { reward: i64, pool: i64 },
}

#[derive(Error, Debug)]
pub enum BlockchainError {
    #[error("network error: {0}")]
    Network(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("consensus error: {0}")]
    Consensus(#[from] BlockError),

    #[error("validation error: {0}")]
    Validation(#[from] TxError),

    #[error("crypto error: {0}")]
    Crypto(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("key error: {0}")]
    Key(String),
}
