//! Deterministic ledger state machine (§4.4): account balances, NFT
//! ownership, nonces, and the unclaimed-issuance pool.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::blockchain::block::Block;
use crate::config::ChainParams;
use crate::error::{BlockError, TxError};
use crate::tx::{NftMeta, SignedTx, TxType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: i64,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftEntry {
    pub owner: String,
    pub meta: NftMeta,
}

/// `{accounts, nfts, next_token_id, unclaimed_pool}` — produced only by
/// block application, never mutated outside that path. `BTreeMap` keeps
/// iteration (and therefore persisted JSON) deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub accounts: BTreeMap<String, AccountState>,
    pub nfts: BTreeMap<u64, NftEntry>,
    pub next_token_id: u64,
    pub unclaimed_pool: i64,
}

impl LedgerState {
    /// A freshly bootstrapped ledger: the full supply sits in the pool,
    /// nothing issued yet.
    pub fn genesis(params: &ChainParams) -> Self {
        Self {
            accounts: BTreeMap::new(),
            nfts: BTreeMap::new(),
            next_token_id: 1,
            unclaimed_pool: params.supply_cap,
        }
    }

    fn account(&mut self, addr: &str) -> &mut AccountState {
        self.accounts.entry(addr.to_string()).or_default()
    }

    fn balance_of(&self, addr: &str) -> i64 {
        self.accounts.get(addr).map(|a| a.balance).unwrap_or(0)
    }
}

/// Applies one transaction to `state` in place. On failure, `state` is left
/// bit-identical to its pre-call value (the universal preconditions and the
/// balance/ownership checks below are evaluated before any mutation).
pub fn apply_tx(state: &mut LedgerState, params: &ChainParams, tx: &SignedTx) -> Result<(), TxError> {
    use crate::tx::verify_tx_sig;

    if !verify_tx_sig(tx) {
        return Err(TxError::BadSignature);
    }
    // verify_tx_sig already checked from/to decode as valid addresses.

    let sender_nonce = state.accounts.get(&tx.from).map(|a| a.nonce).unwrap_or(0);
    if sender_nonce != tx.nonce {
        return Err(TxError::BadNonce);
    }

    let burn_fee = params.burn_fee;

    match tx.tx_type {
        TxType::Transfer => {
            if tx.amount <= 0 {
                return Err(TxError::NonPositiveAmount);
            }
            let total = tx.amount + burn_fee;
            if state.balance_of(&tx.from) < total {
                return Err(TxError::Insufficient);
            }
            state.account(&tx.from).balance -= total;
            state.account(&tx.to).balance += tx.amount;
            state.unclaimed_pool += burn_fee;
        }
        TxType::MintNft => {
            if state.balance_of(&tx.from) < burn_fee {
                return Err(TxError::Insufficient);
            }
            state.account(&tx.from).balance -= burn_fee;
            state.unclaimed_pool += burn_fee;
            let id = state.next_token_id;
            state.next_token_id += 1;
            state.nfts.insert(
                id,
                NftEntry { owner: tx.from.clone(), meta: tx.meta.clone() },
            );
        }
        TxType::TransferNft => {
            if state.balance_of(&tx.from) < burn_fee {
                return Err(TxError::Insufficient);
            }
            match state.nfts.get(&tx.token_id) {
                Some(entry) if entry.owner == tx.from => {}
                _ => return Err(TxError::NotOwner),
            }
            state.account(&tx.from).balance -= burn_fee;
            state.unclaimed_pool += burn_fee;
            state.nfts.get_mut(&tx.token_id).unwrap().owner = tx.to.clone();
        }
        TxType::BurnNft => {
            if state.balance_of(&tx.from) < burn_fee {
                return Err(TxError::Insufficient);
            }
            match state.nfts.get(&tx.token_id) {
                Some(entry) if entry.owner == tx.from => {}
                _ => return Err(TxError::NotOwner),
            }
            state.account(&tx.from).balance -= burn_fee;
            state.unclaimed_pool += burn_fee;
            state.nfts.remove(&tx.token_id);
        }
    }

    state.account(&tx.from).nonce += 1;
    Ok(())
}

/// Applies `block`'s transactions to a scratch copy of `prior`, in order,
/// aborting on the first failure. Also folds the reward bound in here
/// (`block.reward <= pool after txs`) so `apply_block`'s own check is a
/// pure invariant, never a rejection path — the reference implementation
/// left this check dead in `validate_block` and enforced it only in
/// `apply_block`; this port moves it up front.
pub fn validate_block(prior: &LedgerState, params: &ChainParams, block: &Block) -> Result<(), BlockError> {
    let mut scratch = prior.clone();
    for tx in &block.txs {
        apply_tx(&mut scratch, params, tx)?;
    }
    if block.reward < 0 || block.reward > scratch.unclaimed_pool {
        return Err(BlockError::RewardExceedsPool { reward: block.reward, pool: scratch.unclaimed_pool });
    }
    Ok(())
}

/// Re-applies `block`'s transactions against the live state (already
/// validated by `validate_block`), then pays the miner from the pool.
/// Genesis (`reward == 0`, no transactions) credits nobody.
pub fn apply_block(state: &mut LedgerState, params: &ChainParams, block: &Block) -> Result<(), BlockError> {
    for tx in &block.txs {
        apply_tx(state, params, tx)?;
    }
    if block.reward > state.unclaimed_pool {
        return Err(BlockError::RewardExceedsPool { reward: block.reward, pool: state.unclaimed_pool });
    }
    if block.reward > 0 {
        state.unclaimed_pool -= block.reward;
        state.account(&block.miner_address).balance += block.reward;
    }
    Ok(())
}
