//! Merkle root over transaction ids.
//!
//! Deliberately hashes the *ASCII hex string* of each digest rather than the
//! raw 32-byte digest at every level — that is what the original reference
//! node did (its `merkle_root` reuses the hex-encoded preimage bytes at each
//! pairing step) and is preserved here as the canonical rule rather than
//! "fixed", per the design notes this port follows.

use crate::crypto::hash::{double_sha256, hex};

/// `merkle_root([])` is `""`; otherwise the fixed point of iterated
/// pairwise hashing over `hex(double_sha256(tx.id.as_bytes()))` leaves, with
/// an odd trailing element promoted unchanged to the next level.
pub fn merkle_root(tx_ids: &[String]) -> String {
    if tx_ids.is_empty() {
        return String::new();
    }

    let mut level: Vec<String> = tx_ids
        .iter()
        .map(|id| hex(&double_sha256(id.as_bytes())))
        .collect();

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            if pair.len() == 2 {
                let mut concat = Vec::with_capacity(pair[0].len() + pair[1].len());
                concat.extend_from_slice(pair[0].as_bytes());
                concat.extend_from_slice(pair[1].as_bytes());
                next.push(hex(&double_sha256(&concat)));
            } else {
                next.push(pair[0].clone());
            }
        }
        level = next;
    }
    level.into_iter().next().unwrap()
}
