//! Cryptographic primitives: hashing, Base58(Check), addresses, Ed25519, Merkle root.

pub mod address;
pub mod base58;
pub mod hash;
pub mod merkle;
pub mod signatures;

pub use address::{address_from_pubkey, verify_address};
pub use base58::{base58_decode, base58_encode, base58check_decode, base58check_encode};
pub use hash::{double_sha256, hex, sha256, unhex};
pub use merkle::merkle_root;
pub use signatures::{keygen, sign, verify};
