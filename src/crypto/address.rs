//! Address derivation: `Base58Check(ADDRESS_VERSION, SHA256(pubkey)[0..20])`.

use crate::crypto::base58::base58check_decode;
use crate::crypto::base58::base58check_encode;
use crate::crypto::hash::sha256;
use crate::config::ADDRESS_VERSION;

/// Derives the Base58Check address for an Ed25519 public key.
pub fn address_from_pubkey(pubkey: &[u8]) -> String {
    let digest = sha256(pubkey);
    base58check_encode(ADDRESS_VERSION, &digest[..20])
}

/// An address is valid iff it Base58Check-decodes, the version byte is
/// `ADDRESS_VERSION`, and the payload is exactly 20 bytes.
pub fn verify_address(addr: &str) -> bool {
    match base58check_decode(addr) {
        Ok((version, payload)) => version == ADDRESS_VERSION && payload.len() == 20,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signatures::keygen;

    #[test]
    fn derived_address_is_valid() {
        let (pubkey, _priv) = keygen();
        let addr = address_from_pubkey(&pubkey);
        assert!(verify_address(&addr));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let payload = [7u8; 20];
        let addr = crate::crypto::base58::base58check_encode(1, &payload);
        assert!(!verify_address(&addr));
    }

    #[test]
    fn wrong_length_payload_is_rejected() {
        let payload = [7u8; 19];
        let addr = crate::crypto::base58::base58check_encode(ADDRESS_VERSION, &payload);
        assert!(!verify_address(&addr));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(!verify_address("not-an-address"));
    }
}
