//! The local keyring: keys whose blocks this node owns.

use secp256k1::PublicKey;

use crate::{CryptoError, KeyPair};

/// Ordered set of local key pairs. The key index is the position in the ring.
#[derive(Clone, Debug, Default)]
pub struct Keyring {
    keys: Vec<KeyPair>,
    default_index: usize,
}

impl Keyring {
    pub fn new(keys: Vec<KeyPair>) -> Self {
        Self {
            keys,
            default_index: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key(&self, index: usize) -> Option<&KeyPair> {
        self.keys.get(index)
    }

    /// The key used to sign locally assembled blocks.
    pub fn default_key(&self) -> Result<&KeyPair, CryptoError> {
        self.keys
            .get(self.default_index)
            .ok_or(CryptoError::EmptyKeyring)
    }

    pub fn set_default(&mut self, index: usize) -> Result<(), CryptoError> {
        if index >= self.keys.len() {
            return Err(CryptoError::EmptyKeyring);
        }
        self.default_index = index;
        Ok(())
    }

    /// Index of the first key whose public key satisfies `matches`.
    pub fn find_index(&self, mut matches: impl FnMut(&PublicKey) -> bool) -> Option<usize> {
        self.keys.iter().position(|k| matches(&k.public))
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyPair> {
        self.keys.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair_from_seed;

    fn ring() -> Keyring {
        Keyring::new(vec![
            keypair_from_seed(&[1u8; 32]).unwrap(),
            keypair_from_seed(&[2u8; 32]).unwrap(),
        ])
    }

    #[test]
    fn empty_ring_has_no_default() {
        assert_eq!(
            Keyring::empty().default_key().unwrap_err(),
            CryptoError::EmptyKeyring
        );
    }

    #[test]
    fn find_index_by_public_key() {
        let ring = ring();
        let second = ring.key(1).unwrap().public;
        assert_eq!(ring.find_index(|pk| *pk == second), Some(1));
    }

    #[test]
    fn default_can_move() {
        let mut ring = ring();
        ring.set_default(1).unwrap();
        assert_eq!(ring.default_key().unwrap(), ring.key(1).unwrap());
        assert!(ring.set_default(5).is_err());
    }
}
