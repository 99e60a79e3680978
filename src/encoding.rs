//! Canonical (hash/sign) preimages and the base64 helper used by the
//! persistent/wire JSON shape for binary fields (§4.2).
//!
//! The canonical preimage is a manually assembled, length-prefixed byte
//! string rather than a JSON library's `dump()` output: a JSON encoder's key
//! order is not a cross-implementation guarantee, and the spec explicitly
//! flags that as a correctness risk (open question in the original design).
//! Every field here is framed as `<decimal length>:<bytes>` (netstring
//! style) so two independent encoders can never disagree about where one
//! field ends and the next begins, even for attacker-chosen string content.

use crate::blockchain::block::BlockHeader;
use crate::tx::{NftMeta, SignedTx, TxType};

fn push_field(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(bytes.len().to_string().as_bytes());
    buf.push(b':');
    buf.extend_from_slice(bytes);
}

fn push_str(buf: &mut Vec<u8>, s: &str) {
    push_field(buf, s.as_bytes());
}

fn push_int(buf: &mut Vec<u8>, n: i64) {
    push_field(buf, n.to_string().as_bytes());
}

fn push_uint(buf: &mut Vec<u8>, n: u64) {
    push_field(buf, n.to_string().as_bytes());
}

/// The exact byte sequence signed and hashed for a transaction id: type,
/// from, to, amount, nonce, tokenId, meta.{name,symbol,uri} — signature,
/// pubkey, and id are excluded.
pub fn tx_preimage(
    tx_type: TxType,
    from: &str,
    to: &str,
    amount: i64,
    nonce: u64,
    token_id: u64,
    meta: &NftMeta,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    push_uint(&mut buf, tx_type as u64);
    push_str(&mut buf, from);
    push_str(&mut buf, to);
    push_int(&mut buf, amount);
    push_uint(&mut buf, nonce);
    push_uint(&mut buf, token_id);
    push_str(&mut buf, &meta.name);
    push_str(&mut buf, &meta.symbol);
    push_str(&mut buf, &meta.uri);
    buf
}

/// Convenience overload taking a whole `SignedTx`.
pub fn tx_preimage_of(tx: &SignedTx) -> Vec<u8> {
    tx_preimage(
        tx.tx_type,
        &tx.from,
        &tx.to,
        tx.amount,
        tx.nonce,
        tx.token_id,
        &tx.meta,
    )
}

/// The exact byte sequence hashed for a block header: height, prev_hash,
/// merkle_root, timestamp, difficulty_bits, nonce.
pub fn header_preimage(h: &BlockHeader) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    push_uint(&mut buf, h.height);
    push_str(&mut buf, &h.prev_hash);
    push_str(&mut buf, &h.merkle_root);
    push_uint(&mut buf, h.timestamp);
    push_uint(&mut buf, h.difficulty_bits as u64);
    push_uint(&mut buf, h.nonce);
    buf
}

/// Base64 (standard alphabet, `=` padded) serde helper for the binary
/// signature/pubkey fields carried in persistent/wire JSON but never fed
/// into a hash.
pub mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_preimage_is_field_order_stable() {
        let meta = NftMeta { name: "K".into(), symbol: "K".into(), uri: "ipfs://x".into() };
        let a = tx_preimage(TxType::Transfer, "addrA", "addrB", 150_000_000, 0, 0, &meta);
        let b = tx_preimage(TxType::Transfer, "addrA", "addrB", 150_000_000, 0, 0, &meta);
        assert_eq!(a, b);
    }

    #[test]
    fn tx_preimage_framing_prevents_field_collision() {
        // "ab"+"c" and "a"+"bc" must not collide once length-prefixed.
        let meta_empty = NftMeta { name: "".into(), symbol: "".into(), uri: "".into() };
        let a = tx_preimage(TxType::Transfer, "ab", "c", 0, 0, 0, &meta_empty);
        let b = tx_preimage(TxType::Transfer, "a", "bc", 0, 0, 0, &meta_empty);
        assert_ne!(a, b);
    }

    #[test]
    fn header_preimage_is_deterministic() {
        let h = BlockHeader {
            height: 1,
            prev_hash: "abc".into(),
            merkle_root: "".into(),
            timestamp: 1000,
            difficulty_bits: 18,
            nonce: 0,
        };
        assert_eq!(header_preimage(&h), header_preimage(&h));
    }

    #[test]
    fn header_preimage_depends_only_on_six_fields() {
        let h1 = BlockHeader {
            height: 1,
            prev_hash: "abc".into(),
            merkle_root: "".into(),
            timestamp: 1000,
            difficulty_bits: 18,
            nonce: 0,
        };
        let mut h2 = h1.clone();
        h2.nonce = 1;
        assert_ne!(header_preimage(&h1), header_preimage(&h2));
    }
}
