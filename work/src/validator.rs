//! Work threshold checks.

use dagcore_types::{BlockHash, Difficulty};

use crate::{hash_difficulty, WorkError};

/// Whether the hash carries at least `minimum` work.
pub fn meets_difficulty(hash: &BlockHash, minimum: &Difficulty) -> bool {
    hash_difficulty(hash) >= *minimum
}

/// Like [`meets_difficulty`], reporting the shortfall as an error.
pub fn validate_work(hash: &BlockHash, minimum: &Difficulty) -> Result<Difficulty, WorkError> {
    let actual = hash_difficulty(hash);
    if actual < *minimum {
        return Err(WorkError::InsufficientDifficulty {
            actual: actual.to_string(),
            minimum: minimum.to_string(),
        });
    }
    Ok(actual)
}
