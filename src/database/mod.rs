//! Storage contract (§4.6): a block-by-height archive, a single-valued tip
//! pointer, and a ledger snapshot. Any backend satisfying `Store` can sit
//! under `Chain` — `FileStore` is the one shipped here.

pub mod file_store;

use serde::{Deserialize, Serialize};

use crate::blockchain::block::Block;
use crate::config::ChainParams;
use crate::error::BlockchainError;
use crate::ledger::LedgerState;

pub use file_store::FileStore;

/// The tip pointer: the highest-height block currently in the local chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tip {
    pub height: u64,
    pub hash: String,
}

/// The storage contract `Chain` depends on. Implementations must make each
/// individual operation atomic (a partial block write must never become
/// visible) but need not support rollback — `Chain` publishes the tip only
/// after the block and state writes it depends on are durable, so a crash
/// before that point is recovered simply by re-reading the old tip.
pub trait Store {
    /// Idempotently prepares the store. On first use (no prior state),
    /// initialises the ledger snapshot with the full supply unclaimed.
    fn ensure_layout(&self, params: &ChainParams) -> Result<(), BlockchainError>;

    fn write_block(&self, block: &Block) -> Result<(), BlockchainError>;
    fn read_block(&self, height: u64) -> Result<Option<Block>, BlockchainError>;

    fn write_tip(&self, height: u64, hash: &str) -> Result<(), BlockchainError>;
    fn read_tip(&self) -> Result<Option<Tip>, BlockchainError>;

    fn save_state(&self, state: &LedgerState) -> Result<(), BlockchainError>;
    fn load_state(&self) -> Result<Option<LedgerState>, BlockchainError>;
}
