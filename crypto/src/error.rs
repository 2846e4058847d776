use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("secret key out of range")]
    InvalidSecretKey,

    #[error("public key is not a curve point")]
    InvalidPublicKey,

    #[error("malformed signature")]
    InvalidSignature,

    #[error("keyring is empty")]
    EmptyKeyring,
}
