use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkError {
    #[error("work difficulty {actual} below minimum {minimum}")]
    InsufficientDifficulty { actual: String, minimum: String },
}
