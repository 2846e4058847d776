//! Cryptographic primitives for the dagcore ledger.
//!
//! - **secp256k1 ECDSA** for block input/output signatures
//! - **double SHA-256** for block hashes and signature digests
//! - a local [`Keyring`] used for ownership detection and block assembly

pub mod error;
pub mod hash;
pub mod keyring;
pub mod keys;
pub mod sign;

pub use error::CryptoError;
pub use hash::{hash_block, sha256d, sha256d_multi};
pub use keyring::Keyring;
pub use keys::{keypair_from_seed, public_key_from_x, KeyPair};
pub use secp256k1::PublicKey;
pub use sign::{check_signature, sign_digest, verify_digest};
