//! Errors raised while constructing value types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("address has non-zero high bytes")]
    NotAnAddress,

    #[error("unknown network: {0}")]
    UnknownNetwork(String),
}
