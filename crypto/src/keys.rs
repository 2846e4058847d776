//! secp256k1 key pairs.

use std::fmt;
use std::sync::OnceLock;

use secp256k1::{All, PublicKey, Secp256k1, SecretKey};

use crate::CryptoError;

/// Shared signing/verification context.
pub(crate) fn context() -> &'static Secp256k1<All> {
    static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::new)
}

/// A secret key and its public key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub secret: SecretKey,
    pub public: PublicKey,
}

impl KeyPair {
    pub fn from_secret(secret: SecretKey) -> Self {
        let public = PublicKey::from_secret_key(context(), &secret);
        Self { secret, public }
    }

    /// 33-byte SEC1 compressed public key.
    pub fn compressed(&self) -> [u8; 33] {
        self.public.serialize()
    }

    /// X coordinate of the public key, as carried by a wire public-key field.
    pub fn x_bytes(&self) -> [u8; 32] {
        let compressed = self.public.serialize();
        let mut x = [0u8; 32];
        x.copy_from_slice(&compressed[1..]);
        x
    }

    pub fn is_y_odd(&self) -> bool {
        self.public.serialize()[0] == 0x03
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({})", self.public)
    }
}

/// Derive a key pair from 32 seed bytes used directly as the secret scalar.
pub fn keypair_from_seed(seed: &[u8; 32]) -> Result<KeyPair, CryptoError> {
    let secret = SecretKey::from_slice(seed).map_err(|_| CryptoError::InvalidSecretKey)?;
    Ok(KeyPair::from_secret(secret))
}

/// Rebuild a public key from its X coordinate and Y parity.
pub fn public_key_from_x(x: &[u8; 32], y_odd: bool) -> Result<PublicKey, CryptoError> {
    let mut compressed = [0u8; 33];
    compressed[0] = if y_odd { 0x03 } else { 0x02 };
    compressed[1..].copy_from_slice(x);
    PublicKey::from_slice(&compressed).map_err(|_| CryptoError::InvalidPublicKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_deterministic() {
        let a = keypair_from_seed(&[7u8; 32]).unwrap();
        let b = keypair_from_seed(&[7u8; 32]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_seed_is_rejected() {
        assert_eq!(
            keypair_from_seed(&[0u8; 32]).unwrap_err(),
            CryptoError::InvalidSecretKey
        );
    }

    #[test]
    fn x_and_parity_rebuild_key() {
        for seed in 1u8..8 {
            let kp = keypair_from_seed(&[seed; 32]).unwrap();
            let rebuilt = public_key_from_x(&kp.x_bytes(), kp.is_y_odd()).unwrap();
            assert_eq!(rebuilt, kp.public);
        }
    }
}
