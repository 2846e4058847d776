use dagcore_types::BlockAddress;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("malformed block: {reason}")]
    Malformed { reason: String },

    #[error("block layout needs {needed} fields, only {available} fit")]
    TooManyFields { needed: usize, available: usize },

    #[error("block {0} is not known")]
    UnknownBlock(BlockAddress),

    #[error("balance of block {0} would leave the representable range")]
    BalanceOutOfRange(BlockAddress),

    #[error("crypto error: {0}")]
    Crypto(#[from] dagcore_crypto::CryptoError),

    #[error("storage error: {0}")]
    Storage(#[from] dagcore_store::StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

impl From<bincode::Error> for LedgerError {
    fn from(e: bincode::Error) -> Self {
        LedgerError::Serialization(e.to_string())
    }
}
