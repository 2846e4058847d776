use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("ledger error: {0}")]
    Ledger(#[from] dagcore_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] dagcore_store::StoreError),

    #[error("storage backend error: {0}")]
    Lmdb(#[from] dagcore_store_lmdb::LmdbError),

    #[error("crypto error: {0}")]
    Crypto(#[from] dagcore_crypto::CryptoError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("shutdown timeout")]
    ShutdownTimeout,
}
