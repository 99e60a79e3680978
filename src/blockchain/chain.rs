//! `Chain`: owns the tip, the live ledger state, and the difficulty
//! controller, and is the single logical writer (§5) for block acceptance.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::blockchain::block::{header_hash, Block, BlockHeader};
use crate::config::ChainParams;
use crate::consensus::{hash_meets_bits, mine_step, next_difficulty_bits, MiningState};
use crate::database::Store;
use crate::error::{BlockError, BlockchainError};
use crate::ledger::{apply_block, validate_block, LedgerState};
use crate::tx::SignedTx;

fn now_unix() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_secs()
}

pub struct Chain<S: Store> {
    store: S,
    params: ChainParams,
    tip_height: u64,
    tip_hash: String,
    difficulty_bits: u32,
    last_block_time: u64,
    state: LedgerState,
}

impl<S: Store> Chain<S> {
    /// Opens an existing chain at `store`, or bootstraps a fresh one
    /// (genesis block + full-pool ledger state) if the store is empty.
    /// Genesis's own timestamp seeds `last_block_time`, so reward at
    /// height 1 depends on when the chain was initialised — a documented
    /// property of `init`, not a configurable knob (§9).
    pub fn open(store: S, params: ChainParams) -> Result<Self, BlockchainError> {
        store.ensure_layout(&params)?;

        match store.read_tip()? {
            Some(tip) => {
                let state = store
                    .load_state()?
                    .ok_or_else(|| BlockchainError::Storage("tip present but ledger state missing".into()))?;
                let tip_block = store
                    .read_block(tip.height)?
                    .ok_or_else(|| BlockchainError::Storage(format!("tip block {} missing", tip.height)))?;
                Ok(Self {
                    store,
                    params,
                    tip_height: tip.height,
                    tip_hash: tip.hash,
                    difficulty_bits: tip_block.header.difficulty_bits,
                    last_block_time: tip_block.header.timestamp,
                    state,
                })
            }
            None => {
                let timestamp = now_unix();
                let difficulty_bits = crate::config::INITIAL_DIFFICULTY_BITS;
                let genesis = Block::genesis(timestamp, difficulty_bits);
                let state = LedgerState::genesis(&params);

                store.write_block(&genesis)?;
                store.save_state(&state)?;
                store.write_tip(0, &genesis.hash)?;

                Ok(Self {
                    store,
                    params,
                    tip_height: 0,
                    tip_hash: genesis.hash,
                    difficulty_bits,
                    last_block_time: timestamp,
                    state,
                })
            }
        }
    }

    pub fn tip_height(&self) -> u64 {
        self.tip_height
    }

    pub fn tip_hash(&self) -> &str {
        &self.tip_hash
    }

    pub fn difficulty_bits(&self) -> u32 {
        self.difficulty_bits
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn read_block(&self, height: u64) -> Result<Option<Block>, BlockchainError> {
        self.store.read_block(height)
    }

    /// `remaining_secs = max(TARGET_BLOCK_SEC, emission_end - now)`;
    /// `remaining_blocks = max(1, remaining_secs / TARGET_BLOCK_SEC)`;
    /// `reward = max(0, unclaimed_pool / remaining_blocks)` (§4.5).
    fn compute_reward(&self, now: u64) -> i64 {
        let emission_end =
            self.last_block_time as i64 + self.params.emission_years * 365 * 24 * 3600;
        let remaining_secs = std::cmp::max(self.params.target_block_time_sec, emission_end - now as i64);
        let remaining_blocks = std::cmp::max(1, remaining_secs / self.params.target_block_time_sec);
        std::cmp::max(0, self.state.unclaimed_pool / remaining_blocks)
    }

    /// Assembles an unmined block at the current tip: next height, current
    /// tip as `prev_hash`, Merkle root over `txs`, current wall time,
    /// current difficulty, nonce 0.
    pub fn build_block(&self, miner_address: &str, txs: Vec<SignedTx>) -> Block {
        let timestamp = now_unix();
        let merkle_root = Block::merkle_root_of(&txs);
        let reward = self.compute_reward(timestamp);
        let header = BlockHeader {
            height: self.tip_height + 1,
            prev_hash: self.tip_hash.clone(),
            merkle_root,
            timestamp,
            difficulty_bits: self.difficulty_bits,
            nonce: 0,
        };
        let hash = header_hash(&header);
        Block { header, txs, miner_address: miner_address.to_string(), reward, hash }
    }

    /// Re-entrant proof-of-work search: tries up to `budget` nonces,
    /// stamping `block.hash` on success so the caller can interleave other
    /// work (network I/O, a Ctrl-C check) between calls.
    pub fn mine(&self, block: &mut Block, state: &mut MiningState, budget: u64) -> bool {
        match mine_step(&mut block.header, state, budget) {
            Some(hash) => {
                block.hash = hash;
                true
            }
            None => false,
        }
    }

    /// Validates and, on success, atomically accepts `block` as the new
    /// tip (§4.5 steps 1-7). Any failure before persistence leaves the
    /// chain's observable state untouched.
    pub fn accept_block(&mut self, block: Block) -> Result<(), BlockchainError> {
        if block.header.height != self.tip_height + 1 {
            return Err(BlockError::HeightGap { expected: self.tip_height + 1, got: block.header.height }.into());
        }
        if block.header.prev_hash != self.tip_hash {
            return Err(BlockError::BadLinkage.into());
        }
        if block.hash != header_hash(&block.header) || !hash_meets_bits(&block.hash, block.header.difficulty_bits) {
            return Err(BlockError::InsufficientWork.into());
        }

        validate_block(&self.state, &self.params, &block)?;

        let mut new_state = self.state.clone();
        apply_block(&mut new_state, &self.params, &block)?;

        // Tip is published last: a crash between these writes is recovered
        // by re-reading the old tip on restart (§7).
        self.store.write_block(&block)?;
        self.store.save_state(&new_state)?;
        self.store.write_tip(block.header.height, &block.hash)?;

        let dt = block.header.timestamp as i64 - self.last_block_time as i64;
        self.difficulty_bits = next_difficulty_bits(self.difficulty_bits, dt, self.params.target_block_time_sec);
        self.last_block_time = block.header.timestamp;
        self.tip_height = block.header.height;
        self.tip_hash = block.hash;
        self.state = new_state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{address_from_pubkey, keygen};
    use crate::database::FileStore;
    use crate::tx::{sign_tx, NftMeta, TxType, UnsignedTx};

    fn chain() -> (tempfile::TempDir, Chain<FileStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let chain = Chain::open(store, ChainParams::default()).unwrap();
        (dir, chain)
    }

    #[test]
    fn open_bootstraps_genesis_at_height_zero() {
        let (_dir, chain) = chain();
        assert_eq!(chain.tip_height(), 0);
        assert_eq!(chain.state().unclaimed_pool, ChainParams::default().supply_cap);
    }

    #[test]
    fn mining_an_empty_block_advances_tip_and_pays_miner() {
        let (_dir, mut chain) = chain();
        let (pubkey, _priv) = keygen();
        let miner = address_from_pubkey(&pubkey);

        let mut block = chain.build_block(&miner, vec![]);
        let mut mstate = MiningState::new();
        while !chain.mine(&mut block, &mut mstate, 10_000) {}

        let reward = block.reward;
        chain.accept_block(block).unwrap();

        assert_eq!(chain.tip_height(), 1);
        assert_eq!(chain.state().accounts[&miner].balance, reward);
        assert!(reward > 0);
    }

    #[test]
    fn rejects_block_at_wrong_height() {
        let (_dir, mut chain) = chain();
        let (pubkey, _priv) = keygen();
        let miner = address_from_pubkey(&pubkey);
        let mut block = chain.build_block(&miner, vec![]);
        block.header.height = 99;
        block.hash = header_hash(&block.header);
        let err = chain.accept_block(block).unwrap_err();
        assert!(matches!(err, BlockchainError::Consensus(BlockError::HeightGap { .. })));
    }

    #[test]
    fn rejects_block_failing_pow() {
        let (_dir, mut chain) = chain();
        let (pubkey, _priv) = keygen();
        let miner = address_from_pubkey(&pubkey);
        let block = chain.build_block(&miner, vec![]);
        // Unmined: nonce 0 essentially never satisfies difficulty_bits=18.
        let err = chain.accept_block(block).unwrap_err();
        assert!(matches!(err, BlockchainError::Consensus(BlockError::InsufficientWork)));
    }

    #[test]
    fn transfer_block_moves_balance_end_to_end() {
        let (_dir, mut chain) = chain();
        let (pub_a, priv_a) = keygen();
        let (pub_b, _priv_b) = keygen();
        let a = address_from_pubkey(&pub_a);
        let b = address_from_pubkey(&pub_b);

        let mut genesis_mine = chain.build_block(&a, vec![]);
        let mut mstate = MiningState::new();
        while !chain.mine(&mut genesis_mine, &mut mstate, 10_000) {}
        chain.accept_block(genesis_mine).unwrap();
        let funded = chain.state().accounts[&a].balance;

        let tx = sign_tx(
            UnsignedTx {
                tx_type: TxType::Transfer,
                from: a.clone(),
                to: b.clone(),
                amount: 150_000_000,
                nonce: 0,
                token_id: 0,
                meta: NftMeta::default(),
            },
            &priv_a,
        )
        .unwrap();

        let mut block = chain.build_block(&a, vec![tx]);
        let mut mstate = MiningState::new();
        while !chain.mine(&mut block, &mut mstate, 10_000) {}
        chain.accept_block(block).unwrap();

        assert_eq!(chain.state().accounts[&b].balance, 150_000_000);
        assert_eq!(chain.state().accounts[&a].nonce, 1);
        assert!(chain.state().accounts[&a].balance < funded);
    }
}
