//! Ed25519 keypair generation, detached signing and verification (RFC 8032).
//!
//! The secret is carried around as the 64-byte `ed25519_dalek::Keypair`
//! encoding (32-byte seed followed by the 32-byte public key), matching the
//! libsodium convention the reference node was built against: signers can
//! recover the public key from the secret alone, so `SignedTx::pubkey` is
//! always derivable from the 64-byte private key used to sign it.

use ed25519_dalek::{Keypair, PublicKey, Signature, Signer, Verifier};
use rand::rngs::OsRng;

pub const PUBLIC_KEY_LEN: usize = 32;
pub const PRIVATE_KEY_LEN: usize = 64;
pub const SIGNATURE_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum SigError {
    #[error("malformed private key")]
    BadPrivateKey,
}

/// Generates a fresh Ed25519 keypair: `(pub[32], priv[64])`.
pub fn keygen() -> (Vec<u8>, Vec<u8>) {
    let mut csprng = OsRng {};
    let keypair = Keypair::generate(&mut csprng);
    (keypair.public.to_bytes().to_vec(), keypair.to_bytes().to_vec())
}

/// Detached Ed25519 signature over `msg` using the 64-byte private key.
pub fn sign(msg: &[u8], priv_key: &[u8]) -> Result<Vec<u8>, SigError> {
    let bytes: [u8; PRIVATE_KEY_LEN] = priv_key.try_into().map_err(|_| SigError::BadPrivateKey)?;
    let keypair = Keypair::from_bytes(&bytes).map_err(|_| SigError::BadPrivateKey)?;
    Ok(keypair.sign(msg).to_bytes().to_vec())
}

/// Verifies a detached Ed25519 signature against a 32-byte public key.
pub fn verify(msg: &[u8], sig: &[u8], pubkey: &[u8]) -> bool {
    let pub_bytes: [u8; PUBLIC_KEY_LEN] = match pubkey.try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };
    let sig_bytes: [u8; SIGNATURE_LEN] = match sig.try_into() {
        Ok(b) => b,
        Err(_) => return false,
    };
    let public = match PublicKey::from_bytes(&pub_bytes) {
        Ok(p) => p,
        Err(_) => return false,
    };
    let signature = match Signature::from_bytes(&sig_bytes) {
        Ok(s) => s,
        Err(_) => return false,
    };
    public.verify(msg, &signature).is_ok()
}
