//! SHA-256 primitives and hex codec.
//!
//! Every hash-dependent surface in this crate (addresses, transaction ids,
//! block hashes, the Merkle root) is built on `sha256`/`double_sha256` from
//! this module so there is exactly one place that touches the digest crate.

use sha2::{Digest, Sha256};

/// Single SHA-256 pass.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 applied twice, the construction used everywhere a hash is
/// committed to the chain (addresses, tx ids, block hashes, checksums).
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Lowercase, unprefixed hex.
pub fn hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decodes lowercase or uppercase hex; fails on odd length or non-hex nibbles.
pub fn unhex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_sha256_is_sha256_twice() {
        let data = b"axle";
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
    }

    #[test]
    fn hex_roundtrip() {
        let data = [0u8, 1, 2, 0xff, 0xab];
        let s = hex(&data);
        assert_eq!(s, "000102ffab");
        assert_eq!(unhex(&s).unwrap(), data.to_vec());
    }

    #[test]
    fn unhex_rejects_bad_input() {
        assert!(unhex("zz").is_err());
        assert!(unhex("abc").is_err());
    }

    #[test]
    fn known_sha256_vector() {
        // sha256("") per FIPS 180-4 test vectors
        let d = sha256(b"");
        assert_eq!(
            hex(&d),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }
}
