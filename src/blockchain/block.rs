//! `BlockHeader` and `Block` (§3), header hashing, and the Merkle root over
//! transaction ids carried by a block's transaction list.

use serde::{Deserialize, Serialize};

use crate::crypto::{double_sha256, hex, merkle_root};
use crate::encoding::header_preimage;
use crate::tx::SignedTx;

/// The six fields that make up the canonical header preimage (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    pub height: u64,
    pub prev_hash: String,
    pub merkle_root: String,
    pub timestamp: u64,
    pub difficulty_bits: u32,
    pub nonce: u64,
}

/// `hex(double_sha256(header_preimage(h)))`.
pub fn header_hash(h: &BlockHeader) -> String {
    hex(&double_sha256(&header_preimage(h)))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub header: BlockHeader,
    pub txs: Vec<SignedTx>,
    pub miner_address: String,
    pub reward: i64,
    pub hash: String,
}

impl Block {
    /// The fixed-point genesis block: height 0, no prior hash, empty tx
    /// list, no reward, nobody credited.
    pub fn genesis(timestamp: u64, difficulty_bits: u32) -> Self {
        let header = BlockHeader {
            height: 0,
            prev_hash: String::new(),
            merkle_root: String::new(),
            timestamp,
            difficulty_bits,
            nonce: 0,
        };
        let hash = header_hash(&header);
        Block { header, txs: Vec::new(), miner_address: String::new(), reward: 0, hash }
    }

    /// Merkle root over `txs[i].id`, per the merkle-of-hex-strings rule
    /// preserved from the reference implementation (see `crypto::merkle`).
    pub fn merkle_root_of(txs: &[SignedTx]) -> String {
        let ids: Vec<String> = txs.iter().map(|tx| tx.id.clone()).collect();
        merkle_root(&ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(nonce: u64) -> BlockHeader {
        BlockHeader {
            height: 1,
            prev_hash: "a".repeat(64),
            merkle_root: String::new(),
            timestamp: 1_700_000_000,
            difficulty_bits: 18,
            nonce,
        }
    }

    #[test]
    fn genesis_has_no_predecessor_and_no_reward() {
        let g = Block::genesis(1_700_000_000, 18);
        assert_eq!(g.header.height, 0);
        assert_eq!(g.header.prev_hash, "");
        assert_eq!(g.reward, 0);
        assert_eq!(g.miner_address, "");
        assert!(g.txs.is_empty());
        assert_eq!(g.hash, header_hash(&g.header));
    }

    #[test]
    fn header_hash_is_deterministic_and_nonce_sensitive() {
        let h0 = header(0);
        let h1 = header(1);
        assert_eq!(header_hash(&h0), header_hash(&h0));
        assert_ne!(header_hash(&h0), header_hash(&h1));
    }

    #[test]
    fn merkle_root_of_empty_tx_list_is_empty_string() {
        assert_eq!(Block::merkle_root_of(&[]), "");
    }
}
