//! ECDSA signing and verification over 32-byte digests.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, SecretKey};

use crate::keys::context;
use crate::CryptoError;

/// Sign a digest, returning the 64-byte compact `r ‖ s` form.
pub fn sign_digest(digest: &[u8; 32], secret: &SecretKey) -> Result<[u8; 64], CryptoError> {
    let message = Message::from_digest_slice(digest).map_err(|_| CryptoError::InvalidSignature)?;
    let signature = context().sign_ecdsa(&message, secret);
    Ok(signature.serialize_compact())
}

/// Verify a compact signature. Malformed input verifies as `false`.
pub fn verify_digest(digest: &[u8; 32], signature: &[u8; 64], public_key: &PublicKey) -> bool {
    let Ok(message) = Message::from_digest_slice(digest) else {
        return false;
    };
    let Ok(mut signature) = Signature::from_compact(signature) else {
        return false;
    };
    signature.normalize_s();
    context()
        .verify_ecdsa(&message, &signature, public_key)
        .is_ok()
}

/// Reject 64 bytes that cannot be a compact `r ‖ s` pair.
pub fn check_signature(signature: &[u8; 64]) -> Result<(), CryptoError> {
    Signature::from_compact(signature)
        .map(|_| ())
        .map_err(|_| CryptoError::InvalidSignature)
}
