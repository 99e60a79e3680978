//! Base58 and Base58Check, Bitcoin alphabet.
//!
//! The alphabet encode/decode step is `bs58` (the crate two other pack
//! repos already reach for — `dxid-crypto`'s `address_to_string`/
//! `address_from_string`, `unicorn-research-app/api`'s dependency list);
//! the checksum construction (`base58check_encode`/`base58check_decode`)
//! is independent logic layered on top, exactly as it would sit on top of
//! a hand-rolled encoder.

use crate::crypto::hash::double_sha256;

/// Encodes raw bytes as Base58 (Bitcoin alphabet), preserving leading zero
/// bytes as leading `'1'`s.
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes Base58 text back to bytes. Fails on any character outside the alphabet.
pub fn base58_decode(s: &str) -> Result<Vec<u8>, Base58Error> {
    bs58::decode(s).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, .. } => Base58Error::InvalidCharacter(character),
        other => Base58Error::InvalidCharacter(other.to_string().chars().next().unwrap_or('?')),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum Base58Error {
    #[error("invalid base58 character: {0:?}")]
    InvalidCharacter(char),
    #[error("base58check payload too short")]
    TooShort,
    #[error("base58check checksum mismatch")]
    BadChecksum,
}

/// `base58(version ‖ payload ‖ double_sha256(version ‖ payload)[0..4])`.
pub fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + 4);
    data.push(version);
    data.extend_from_slice(payload);
    let checksum = double_sha256(&data);
    data.extend_from_slice(&checksum[..4]);
    base58_encode(&data)
}

/// Decodes a Base58Check string, verifying the trailing 4-byte checksum.
pub fn base58check_decode(s: &str) -> Result<(u8, Vec<u8>), Base58Error> {
    let data = base58_decode(s)?;
    if data.len() < 5 {
        return Err(Base58Error::TooShort);
    }
    let (body, checksum) = data.split_at(data.len() - 4);
    let expected = double_sha256(body);
    if &expected[..4] != checksum {
        return Err(Base58Error::BadChecksum);
    }
    Ok((body[0], body[1..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base58_roundtrip_empty() {
        assert_eq!(base58_decode(&base58_encode(&[])).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn base58_roundtrip_leading_zeros() {
        let data = vec![0, 0, 1, 2, 3];
        let enc = base58_encode(&data);
        assert!(enc.starts_with("11"));
        assert_eq!(base58_decode(&enc).unwrap(), data);
    }

    #[test]
    fn base58_known_vector() {
        // "Hello World" -> well-known base58 encoding.
        assert_eq!(base58_encode(b"Hello World"), "JxF12TrwUP45BMd");
    }

    #[test]
    fn base58_rejects_invalid_alphabet() {
        assert!(base58_decode("0OIl").is_err());
    }

    #[test]
    fn base58check_roundtrip() {
        let payload = vec![1u8; 20];
        let s = base58check_encode(23, &payload);
        let (v, p) = base58check_decode(&s).unwrap();
        assert_eq!(v, 23);
        assert_eq!(p, payload);
    }

    #[test]
    fn base58check_detects_corruption() {
        let s = base58check_encode(23, &[9u8; 20]);
        let mut bytes: Vec<char> = s.chars().collect();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == '1' { '2' } else { '1' };
        let corrupted: String = bytes.into_iter().collect();
        assert!(base58check_decode(&corrupted).is_err());
    }
}
