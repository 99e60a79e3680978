//! Transaction model: the five-variant tagged union (§4.3), signing, and
//! signature verification.
//!
//! Expressed as a single struct carrying a `TxType` tag plus the union of
//! all variant fields, each field defaulting to its zero value when unused
//! by a given variant — a tagged union with per-variant validators, as the
//! design notes call for, rather than dynamic dispatch over a trait object.

use serde::{Deserialize, Serialize};

use crate::crypto::{address_from_pubkey, double_sha256, hex, sign, verify, verify_address};
use crate::encoding::{b64, tx_preimage_of};
use crate::error::TxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TxType {
    Transfer = 0,
    MintNft = 1,
    TransferNft = 2,
    BurnNft = 3,
}

impl TxType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(TxType::Transfer),
            1 => Some(TxType::MintNft),
            2 => Some(TxType::TransferNft),
            3 => Some(TxType::BurnNft),
            _ => None,
        }
    }
}

// Persistent/wire JSON carries `type` as the plain integer 0..3 (matching
// the canonical preimage), not as a string variant name.
impl Serialize for TxType {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for TxType {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = u8::deserialize(d)?;
        TxType::from_u8(v).ok_or_else(|| serde::de::Error::custom(format!("unknown tx type {v}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMeta {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// Fields needed to build and sign a new transaction; distinct from
/// `SignedTx` so a half-signed transaction is not representable.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
    pub tx_type: TxType,
    pub from: String,
    pub to: String,
    pub amount: i64,
    pub nonce: u64,
    pub token_id: u64,
    pub meta: NftMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedTx {
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub from: String,
    pub to: String,
    pub amount: i64,
    pub nonce: u64,
    #[serde(rename = "tokenId")]
    pub token_id: u64,
    pub meta: NftMeta,
    #[serde(with = "b64")]
    pub signature: Vec<u8>,
    #[serde(with = "b64")]
    pub pubkey: Vec<u8>,
    pub id: String,
}

/// Signs `unsigned` with `priv_key`, computing the canonical preimage once
/// for both the signature and the id (`hex(double_sha256(preimage))`), and
/// deriving `pubkey` as the last 32 bytes of the 64-byte private key.
pub fn sign_tx(unsigned: UnsignedTx, priv_key: &[u8]) -> Result<SignedTx, TxError> {
    let mut tx = SignedTx {
        tx_type: unsigned.tx_type,
        from: unsigned.from,
        to: unsigned.to,
        amount: unsigned.amount,
        nonce: unsigned.nonce,
        token_id: unsigned.token_id,
        meta: unsigned.meta,
        signature: Vec::new(),
        pubkey: Vec::new(),
        id: String::new(),
    };
    let preimage = tx_preimage_of(&tx);
    tx.signature = sign(&preimage, priv_key).map_err(|_| TxError::BadSignature)?;
    tx.pubkey = priv_key[32..].to_vec();
    tx.id = hex(&double_sha256(&preimage));
    Ok(tx)
}

/// Requires `from`/`to` to be valid addresses, `address_from_pubkey(pubkey)
/// == from` (the pubkey-binding check the reference implementation is
/// missing — see the design notes), and a valid Ed25519 signature over the
/// canonical preimage.
pub fn verify_tx_sig(tx: &SignedTx) -> bool {
    if !verify_address(&tx.from) || !verify_address(&tx.to) {
        return false;
    }
    if address_from_pubkey(&tx.pubkey) != tx.from {
        return false;
    }
    let preimage = tx_preimage_of(tx);
    verify(&preimage, &tx.signature, &tx.pubkey)
}
